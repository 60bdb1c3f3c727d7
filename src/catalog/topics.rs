const BEGINNERS: &str = "pjjft5joql5j95u7radbchs51g";
const BINARY_SEARCH: &str = "3hr591p5lh7a9c5k9bg8kpvctg";
const BITMASKS: &str = "ab0l1n5rsl3618ntv9ode0qn5k";
const BITWISE: &str = "mnvqr2ggu10jl7r8kpmdsusqlk";
const CONSTRUCTIVE: &str = "7s78regvmt1ata79gr1ndlu67o";
const DFS: &str = "amb5r8c4bt1395uneribtcnces";
const DIJKSTRA: &str = "httb8civtl0u74jm2e143pm5ok";
const DSU: &str = "eo9vh68hjd1kbf445f8aoi8rlc";
const DP: &str = "agd25lpqt52m565ljb65l0mqg0";
const FLOWS: &str = "m2ouonsldt4cdd6mnuu5pm7kq8";
const GAMES: &str = "liijhm523122177op14gmgjd18";
const GRAPHS: &str = "msh9q06gah6hpds3m0dceu3ff8";
const IMPLEMENTATION: &str = "nivqcdt8d93tff7rtkk7lu9ur8";
const MATH: &str = "o44qcs7mvt6nj6k5qcliev933g";
const MATRIX: &str = "onl6ffbeq56bpaskrv54o6qdlc";
const NUMBER_THEORY: &str = "p1so0jh9k96m3f8t5u70l8nphc";
const PRIME_FACTORIZATION: &str = "s6akn539f93sjfndpv3tm8j4io";
const RANGE_QUERIES: &str = "uulanemp6l6lp9h5ja68k9u4pg";
const SCANLINE: &str = "f73kkr3fo932d0a0orkg8m4tb4";
const SORTING: &str = "q5g5r2to9t3h11e9g7gsoeiius";
const SQRT: &str = "u6atdab8ih6vv59u1768hcf85c";
const STACKS: &str = "8glqsj58uh5a17b171itjedcog";
const TWO_POINTERS: &str = "mougogmuf10i3b5gpp7ur935l0";

// Lower-cased package tag -> topic ids. Tags mapped to nothing are known but carry no topic.
pub(super) const TAG_TOPICS: &[(&str, &[&str])] = &[
    ("2-sat", &["4qpkrclrfl7rv5lic8djr3lldk"]),
    ("2d array", &[BEGINNERS]),
    ("ad-hoc", &[]),
    ("adhoc", &[]),
    ("arrays", &[BEGINNERS]),
    ("backtracking", &[DFS]),
    ("bacs_review", &[]),
    ("beginner", &[BEGINNERS]),
    ("bfs", &["c79dhqpr712uv2feapbaodn6ds"]),
    ("binary search", &[BINARY_SEARCH]),
    ("binsearch", &[BINARY_SEARCH]),
    ("bitmask-dp", &[BITMASKS, DP]),
    ("bitmasks", &[BITMASKS]),
    ("bitwise operation", &[BITWISE]),
    ("bracket sequences", &[]),
    ("brute force", &["5cl1ftokid1bn751ql21o0vdbs"]),
    ("chinese remainder theorem", &["5nletoaur90j97jm9ac29rtkts"]),
    ("codework", &[]),
    ("combinatorics", &["66aoi354mt23da5mrt4npes0o0"]),
    ("constructive", &[CONSTRUCTIVE]),
    ("constructive algorithms", &[CONSTRUCTIVE]),
    ("convex hull", &["b03jtl2ah5371f5msag4pspv0g"]),
    ("data structures", &["8asv7g7jbl7hjclnc5ehiiamcs"]),
    ("dejkstra", &[DIJKSTRA]),
    ("deque", &[]),
    ("dfs", &[DFS]),
    ("dfs and similar", &[DFS]),
    ("dijkstra", &[DIJKSTRA]),
    ("disjoint set union", &[DSU]),
    ("disjoint sets", &[DSU]),
    ("div3", &[BEGINNERS]),
    ("divide and conquer", &["ad9840pj2d0rl10o0vja3c7q6g"]),
    ("djikstra", &[DIJKSTRA]),
    ("dp", &[DP]),
    ("dp optimization", &["l7ehngruct3479vqegsnu8vng8"]),
    ("dsu", &[DSU]),
    ("dynamic programming", &[DP]),
    ("easy", &[BEGINNERS]),
    ("example", &[]),
    ("expression parsing", &["lqcb6ciath3crca477lrib36oo"]),
    ("factorization", &[PRIME_FACTORIZATION]),
    ("fenwick tree", &["drqgu3n5k10ep27aguknkvhbsk"]),
    ("fft", &["uoicsgaimp4f71sputplg5rd48"]),
    ("flows", &[FLOWS]),
    ("for", &[BEGINNERS]),
    ("formula", &[]),
    ("game theory", &[GAMES]),
    ("games", &[GAMES]),
    ("geometry", &["mn2buv28bp02v88uj715svnoro"]),
    ("graph", &[GRAPHS]),
    ("graph matchings", &["mnki3h2qo51l91og62es1spa54"]),
    ("graph theory", &[GRAPHS]),
    ("graphs", &[GRAPHS]),
    ("greedy", &["n0b0meiu7p51tekkqefeafqat0"]),
    ("hashing", &["n4irjrf3ot0rbdit566sbjrbio"]),
    ("if", &[]),
    ("implementation", &[IMPLEMENTATION]),
    ("interactive", &["nlp1qosu1h7jj8k8t9dn2131rg"]),
    ("java", &[]),
    ("joke", &[]),
    ("lksh", &[]),
    ("math", &[MATH]),
    ("maths", &[MATH]),
    ("matrices", &[MATRIX]),
    ("matrix", &[MATRIX]),
    ("matrix exponentiation", &[MATRIX]),
    ("maxflow", &[FLOWS]),
    ("meet-in-the-middle", &["34iiosa5s141r4msjhctjb6g74"]),
    ("number theory", &[NUMBER_THEORY]),
    ("optimization", &["k0t2kb3p1d2r1clduv3nhlsnic"]),
    ("prefix sums", &["h2pti09sm104fdee212ir6i4fs"]),
    ("prefix-function", &["0tdg3jl6857bn83t3t70mj0fkg"]),
    ("prime factorization", &[PRIME_FACTORIZATION]),
    ("priority queue", &["ojlb9b433d41f2lmiab34b98qc"]),
    ("probabilities", &["pdoel1o5e936ve124idn9ar4dc"]),
    ("queries", &["vsgktagv113fldeso88u2q9k38"]),
    ("queue", &[]),
    ("randomized-algorithms", &["7snfna87rp69bbl5fln6i8bvqc"]),
    ("range queries", &[RANGE_QUERIES]),
    ("realization", &[IMPLEMENTATION]),
    ("recursion", &[]),
    ("rmq", &[RANGE_QUERIES]),
    ("scanline", &[SCANLINE]),
    ("schedules", &["psh4svain501l2nbobe0njvmm0"]),
    ("segment tree", &["3arh7cff3t58l4ur4u1754iomg"]),
    ("shortest paths", &["q44u43ajtp7eb9bhn6e4h6mf1s"]),
    ("sieve of eratosthenes", &[NUMBER_THEORY]),
    ("simple", &[BEGINNERS]),
    ("simple math", &[MATH, BEGINNERS]),
    ("sorting", &[SORTING]),
    ("sortings", &[SORTING]),
    ("sqrt", &[SQRT]),
    ("sqrt-decomposition", &[SQRT]),
    ("stack", &[STACKS]),
    ("stacks", &[STACKS]),
    ("string suffix structures", &["q7uda9h3jl6711deg0i76fatdc"]),
    ("strings", &["ql34pmh9fh0ofdsb8jo3brsk1s"]),
    ("suffix array", &["9tvaiar64t2f33rlucma58ckn4"]),
    ("sweep line", &[SCANLINE]),
    ("tarjan", &[GRAPHS]),
    ("ternary search", &["qm3576n3id76901nrcanp00alk"]),
    ("trees", &["jbe4odf0rl39rc6vtvst7kuro0"]),
    ("trivial", &[BEGINNERS]),
    ("two pointers", &[TWO_POINTERS]),
    ("two-pointers", &[TWO_POINTERS]),
    ("very easy", &[BEGINNERS]),
    ("while", &[BEGINNERS]),
    ("xor", &[BITWISE]),
    ("z-function", &["mfucls2rs90q9be0rgeslvt61o"]),
];
