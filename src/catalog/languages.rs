// Polygon source type -> platform runtime.
pub(super) const POLYGON_RUNTIMES: &[(&str, &str)] = &[
    ("c.gcc", "c:17-gnu10"),
    ("cpp.g++", "cpp:17-gnu10"),
    ("cpp.g++11", "cpp:17-gnu10"),
    ("cpp.g++14", "cpp:17-gnu10"),
    ("cpp.g++17", "cpp:17-gnu10"),
    ("cpp.ms", "cpp:17-gnu10"),
    ("cpp.msys2-mingw64-9-g++17", "cpp:17-gnu10"),
    ("cpp.g++20", "cpp:20-gnu14"),
    ("cpp.gcc11-64-winlibs-g++20", "cpp:20-gnu14"),
    ("cpp.gcc13-64-winlibs-g++20", "cpp:20-gnu14"),
    ("cpp.gcc14-64-msys2-g++23", "cpp:23-gnu14"),
    ("csharp.mono", "csharp:5-dotnet"),
    ("d", "d:1-gdc"),
    ("go", "go:1.20"),
    ("java8", "java:1.8"),
    ("java11", "java:1.17"),
    ("java21", "java:1.21"),
    ("kotlin", "kotlin:1.7"),
    ("kotlin16", "kotlin:1.7"),
    ("kotlin17", "kotlin:1.7"),
    ("kotlin19", "kotlin:1.9"),
    ("pas.dpr", "pascal:3.2"),
    ("pas.fpc", "pascal:3.2"),
    ("php.5", "php:7.4"),
    ("python.2", "python:3-python"),
    ("python.3", "python:3-python"),
    ("python.pypy2", "python:3-pypy"),
    ("python.pypy3", "python:3-pypy"),
    ("python.pypy3-64", "python:3-pypy"),
    ("ruby", "ruby:2.4"),
    ("ruby.2", "ruby:2.4"),
    ("rust", "rust:1.78"),
];

// Language -> canonical source file extension.
pub(super) const EXTENSIONS: &[(&str, &str)] = &[
    ("c", "c"),
    ("cpp", "cpp"),
    ("d", "d"),
    ("csharp", "cs"),
    ("go", "go"),
    ("java", "java"),
    ("kotlin", "kt"),
    ("pascal", "pas"),
    ("php", "php"),
    ("python", "py"),
    ("ruby", "rb"),
    ("rust", "rs"),
    ("haskell", "hs"),
    ("js", "js"),
    ("lua", "lua"),
    ("perl", "pl"),
    ("swift", "swift"),
];

// Additional extensions seen in packages that are not the canonical one.
pub(super) const EXTENSION_ALIASES: &[(&str, &str)] = &[
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("c++", "cpp"),
    ("py3", "python"),
];

// Runtime a bare source file is compiled with when the package names only its language.
pub(super) const DEFAULT_RUNTIMES: &[(&str, &str)] = &[
    ("c", "c:17-gnu10"),
    ("cpp", "cpp:17-gnu10"),
    ("csharp", "csharp:5-dotnet"),
    ("d", "d:1-gdc"),
    ("go", "go:1.20"),
    ("haskell", "haskell:8.8-ghc"),
    ("java", "java:1.21"),
    ("js", "js:18"),
    ("kotlin", "kotlin:1.9"),
    ("lua", "lua:5.1"),
    ("pascal", "pascal:3.2"),
    ("perl", "perl:5.32"),
    ("php", "php:7.4"),
    ("python", "python:3-python"),
    ("ruby", "ruby:2.4"),
    ("rust", "rust:1.78"),
    ("swift", "swift:5.6"),
];

// Runtimes a template written in the language is published for.
pub(super) const TEMPLATE_RUNTIMES: &[(&str, &[&str])] = &[
    ("c", &["c:17-gnu10"]),
    (
        "cpp",
        &[
            "cpp:11-gnu10",
            "cpp:17-gnu10",
            "cpp:17-gnu10-extra",
            "cpp:20-gnu10",
            "cpp:20-gnu10-extra",
            "cpp:20-gnu14",
            "cpp:20-gnu14-extra",
            "cpp:23-gnu10",
            "cpp:23-gnu10-extra",
            "cpp:23-gnu14",
            "cpp:23-gnu14-extra",
        ],
    ),
    ("csharp", &["csharp:5-dotnet", "csharp:5-mono"]),
    ("d", &["d:1-dmd", "d:1-gdc"]),
    ("go", &["go:1.20"]),
    ("haskell", &["haskell:8.8-ghc"]),
    ("java", &["java:1.21"]),
    ("js", &["js:18"]),
    ("kotlin", &["kotlin:1.9"]),
    ("lua", &["lua:5.1"]),
    ("pascal", &["pascal:3.2"]),
    ("perl", &["perl:5.32"]),
    ("php", &["php:7.4"]),
    (
        "python",
        &[
            "python:3.10-pypy",
            "python:3.10-pypy-extra",
            "python:3.11-ai",
            "python:3.11-python",
            "python:3.11-python-extra",
        ],
    ),
    ("ruby", &["ruby:2.4"]),
    ("rust", &["rust:1.78"]),
    ("swift", &["swift:5.6"]),
];

// Statement language name -> locale code.
pub(super) const LOCALES: &[(&str, &str)] = &[
    ("ukrainian", "uk"),
    ("russian", "ru"),
    ("english", "en"),
    ("hungarian", "hu"),
    ("azerbaijani", "az"),
    ("french", "fr"),
    ("arabic", "ar"),
    ("uzbek", "uz"),
    ("slovene", "sl"),
    ("armenian", "hy"),
    ("lithuanian", "lt"),
    ("serbian", "sr"),
    ("kazakh", "kk"),
    ("spanish", "es"),
    ("polish", "pl"),
    ("german", "de"),
    ("turkish", "tr"),
];
