use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use sunwalker_importer::{
    catalog::Catalog,
    errors::ImportError,
    kattis::converter::KattisLoader,
    problem::snapshot::{
        Checker, Content, FeedbackPolicy, Generator, ProblemKind, ScoringMode, SolutionKind,
        TestData,
    },
    upload::{memory::MemoryStore, Uploader},
    Format, ProblemLoader,
};

const PROBLEM_YAML: &str = r#"
problem_format_version: 2023-07-draft
type: pass-fail
name:
  en: Hello
  sv: Hej
author: Alice Author
keywords: [dp, Graphs]
limits:
  time_limit: 2.5
  memory: 512
"#;

fn put(root: &Path, path: &str, data: impl AsRef<[u8]>) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, data).unwrap();
}

fn fill(root: &Path, problem_yaml: &str) {
    put(root, "problem.yaml", problem_yaml);
    put(root, "statement/problem.en.md", "# Hello\n");
    put(root, "statement/problem.sv.tex", "Hej \\includegraphics{fig.png}");
    put(root, "statement/fig.png", b"\x89PNG");
    put(root, "data/sample/1.in", "1\n");
    put(root, "data/sample/1.ans", "1\n");
    put(root, "data/secret/group1/testdata.yaml", "grader_flags: min\n");
    put(root, "data/secret/group1/01.in", "2\n");
    put(root, "data/secret/group1/01.ans", "4\n");
    put(root, "data/secret/group1/02.in", "3\n");
    put(root, "data/secret/group2/test_group.yaml", "full_feedback: true\n");
    put(root, "data/secret/group2/01.in", "10\n");
    put(root, "data/secret/group2/01.ans", "100\n");
    put(root, "input_validators/validate.py", "import sys\n");
    put(root, "attachments/tools/testing_tool.py", "print('hi')\n");
    put(root, "submissions/accepted/sol.cpp", "// ok\n");
    put(root, "submissions/accepted/README.txt", "notes\n");
    put(root, "submissions/run_time_error/crash.cpp", "// crash\n");
    put(root, "submissions/wrong_answer/wa.java", "class WA {}\n");
    put(root, "generators/gen.py", "print(1)\n");
    put(root, "generators/generators.yaml", "solution: /submissions/accepted/sol.cpp\n");
    put(root, "solution/solution.en.tex", "Square it.");
}

fn package(problem_yaml: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fill(dir.path(), problem_yaml);
    dir
}

fn loader(store: Arc<MemoryStore>) -> Box<dyn ProblemLoader> {
    Format::Kattis.loader(Uploader::new(store), Arc::new(Catalog::builtin()))
}

async fn import(root: &Path) -> Result<sunwalker_importer::problem::snapshot::Snapshot, ImportError> {
    loader(Arc::new(MemoryStore::new())).snapshot(root).await
}

fn failed_step(result: Result<impl std::fmt::Debug, ImportError>) -> (&'static str, ImportError) {
    match result {
        Err(ImportError::Step { step, source }) => (step, *source),
        other => panic!("expected a step failure, got {other:?}"),
    }
}

#[tokio::test]
async fn full_package() {
    let dir = package(PROBLEM_YAML);
    let store = Arc::new(MemoryStore::new());
    let snapshot = loader(store.clone()).snapshot(dir.path()).await.unwrap();

    assert_eq!(snapshot.problem.kind, ProblemKind::Program);
    assert_eq!(
        snapshot.problem.topics,
        Catalog::builtin().topics(["dp", "graphs"])
    );
    assert_eq!(snapshot.testing.run_count, 1);
    assert!(!snapshot.testing.interactive_followup);
    assert_eq!(snapshot.checker, Some(Checker::tokens(0, false)));
    assert!(snapshot.interactor.is_none());
    assert!(snapshot.templates.is_empty());

    let validator = snapshot.validator.as_ref().unwrap();
    assert_eq!(validator.runtime, "python:3-python");
    assert_eq!(validator.source, "import sys\n");

    let statements: Vec<_> = snapshot
        .statements
        .iter()
        .map(|s| (s.locale.as_str(), s.title.as_str(), s.author.as_str()))
        .collect();
    assert_eq!(
        statements,
        vec![("en", "Hello", "Alice Author"), ("sv", "Hej", "Alice Author")]
    );
    assert_eq!(
        snapshot.statements[0].content,
        Content::Markdown("# Hello\n".to_string())
    );
    let Content::Latex(text) = &snapshot.statements[1].content else {
        panic!("expected LaTeX statement");
    };
    assert!(text.starts_with("Hej \\includegraphics{memory://"));

    // Samples come first, then the secret groups in name order
    let testsets: Vec<_> = snapshot
        .testsets
        .iter()
        .map(|t| (t.index, t.scoring_mode, t.feedback_policy))
        .collect();
    assert_eq!(
        testsets,
        vec![
            (0, ScoringMode::Each, FeedbackPolicy::Complete),
            (1, ScoringMode::Worst, FeedbackPolicy::IcpcExpanded),
            (2, ScoringMode::All, FeedbackPolicy::Complete),
        ]
    );
    assert!(snapshot.testsets.iter().all(|t| t.cpu_limit_ms == 2500
        && t.memory_limit_bytes == 512 << 20
        && t.file_size_limit_bytes == 512 << 20));

    let ids: Vec<&str> = snapshot.testsets.iter().map(|t| t.id.as_str()).collect();
    let placement: Vec<_> = snapshot
        .tests
        .iter()
        .map(|test| (test.testset_id.as_str(), test.index, test.example, test.score))
        .collect();
    assert_eq!(
        placement,
        vec![
            (ids[0], 1, true, 25.0),
            (ids[1], 1, false, 25.0),
            (ids[1], 2, false, 25.0),
            (ids[2], 1, false, 25.0),
        ]
    );

    let sample = &snapshot.tests[0];
    assert_eq!(sample.example_input_url.as_deref(), sample.input.url());
    assert_eq!(sample.example_answer_url.as_deref(), sample.answer.url());
    assert_eq!(store.object(sample.input.url().unwrap()).unwrap(), b"1\n");

    let missing_answer = &snapshot.tests[2];
    assert_eq!(store.object(missing_answer.input.url().unwrap()).unwrap(), b"3\n");
    assert_eq!(missing_answer.answer, TestData::Generator(Generator::solution()));
    assert_eq!(missing_answer.example_input_url, None);

    assert_eq!(snapshot.attachments.len(), 1);
    assert_eq!(snapshot.attachments[0].name, "testing_tool.py");

    let solutions: Vec<_> = snapshot
        .solutions
        .iter()
        .map(|s| (s.name.as_str(), s.kind))
        .collect();
    assert_eq!(
        solutions,
        vec![
            ("sol.cpp", SolutionKind::Correct),
            ("crash.cpp", SolutionKind::DontRun),
            ("wa.java", SolutionKind::WrongAnswer),
        ]
    );

    assert_eq!(snapshot.scripts.len(), 1);
    assert_eq!(snapshot.scripts[0].name, "gen");
    assert_eq!(snapshot.scripts[0].runtime, "python:3-python");

    assert_eq!(snapshot.editorials.len(), 1);
    assert_eq!(snapshot.editorials[0].locale, "en");
    assert_eq!(
        snapshot.editorials[0].content,
        Content::Latex("Square it.".to_string())
    );
}

#[tokio::test]
async fn package_inside_a_single_directory() {
    let dir = tempfile::tempdir().unwrap();
    fill(&dir.path().join("hello"), PROBLEM_YAML);

    let snapshot = import(dir.path()).await.unwrap();
    assert_eq!(snapshot.tests.len(), 4);
}

#[tokio::test]
async fn missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a")).unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();

    assert!(matches!(
        import(dir.path()).await,
        Err(ImportError::ManifestMissing { .. })
    ));
}

#[tokio::test]
async fn secret_data_is_required() {
    let dir = package(PROBLEM_YAML);
    std::fs::remove_dir_all(dir.path().join("data/secret")).unwrap();

    let (step, source) = failed_step(import(dir.path()).await);
    assert_eq!(step, "tests");
    assert!(matches!(source, ImportError::MissingDirectory(path) if path.ends_with("data/secret")));
}

#[tokio::test]
async fn flat_secret_directory_is_one_testset() {
    let dir = package(PROBLEM_YAML);
    let secret = dir.path().join("data/secret");
    std::fs::remove_dir_all(&secret).unwrap();
    put(&secret, "1.in", "1\n");
    put(&secret, "1.ans", "1\n");
    put(&secret, "2.in", "2\n");
    put(&secret, "2.ans", "2\n");

    let snapshot = import(dir.path()).await.unwrap();
    assert_eq!(snapshot.testsets.len(), 2);
    assert_eq!(
        snapshot.tests.iter().map(|t| t.score).collect::<Vec<_>>(),
        vec![33.0, 33.0, 34.0]
    );
}

#[tokio::test]
async fn pdf_statement_is_rejected() {
    let dir = package(PROBLEM_YAML);
    put(dir.path(), "statement/problem.pdf", b"%PDF-1.4");

    let (step, source) = failed_step(import(dir.path()).await);
    assert_eq!(step, "statements");
    assert!(matches!(source, ImportError::UnsupportedStatement { format, .. } if format == "pdf"));
}

#[tokio::test]
async fn statements_are_required() {
    let dir = package(PROBLEM_YAML);
    std::fs::remove_dir_all(dir.path().join("statement")).unwrap();
    put(dir.path(), "problem_statement/notes.txt", "nothing here");

    let (step, source) = failed_step(import(dir.path()).await);
    assert_eq!(step, "statements");
    assert!(matches!(source, ImportError::NoStatements(_)));
}

#[tokio::test]
async fn legacy_limits_and_validator_flags() {
    let yaml = "name: Hello\nvalidator_flags: float_tolerance 1e-6 case_sensitive\n";
    let dir = package(yaml);
    put(dir.path(), ".timelimit", "3\n");

    let snapshot = import(dir.path()).await.unwrap();
    assert_eq!(snapshot.checker, Some(Checker::tokens(6, true)));
    assert!(snapshot.testsets.iter().all(|t| t.cpu_limit_ms == 3000
        && t.memory_limit_bytes == 2048 << 20));
    assert_eq!(snapshot.statements[1].title, "Hello");
}

#[tokio::test]
async fn output_validator_becomes_the_checker() {
    let dir = package(PROBLEM_YAML);
    put(dir.path(), "output_validators/compare/compare.cpp", "int main() {}\n");
    put(dir.path(), "output_validators/compare/testlib.h", "#pragma once\n");

    let snapshot = import(dir.path()).await.unwrap();
    let Some(Checker::Program(checker)) = &snapshot.checker else {
        panic!("expected a checker program, got {:?}", snapshot.checker);
    };
    assert_eq!(checker.runtime, "cpp:17-gnu10");
    assert_eq!(checker.files.len(), 1);
    assert_eq!(checker.files[0].path, "testlib.h");
}

#[tokio::test]
async fn interactive_multi_pass() {
    let yaml = "name: Guess\ntype: [interactive, multi-pass]\nlimits:\n  validation_passes: 3\n";
    let dir = package(yaml);
    put(dir.path(), "output_validator/interactor.cpp", "int main() {}\n");

    let snapshot = KattisLoader::new(
        Uploader::new(Arc::new(MemoryStore::new())),
        Arc::new(Catalog::builtin()),
    )
    .snapshot(dir.path())
    .await
    .unwrap();

    assert_eq!(snapshot.checker, None);
    assert_eq!(snapshot.interactor.unwrap().source, "int main() {}\n");
    assert_eq!(snapshot.testing.run_count, 3);
    assert!(snapshot.testing.interactive_followup);
}

#[tokio::test]
async fn interactive_problem_needs_an_interactor() {
    let dir = package("type: interactive\n");

    let (step, source) = failed_step(import(dir.path()).await);
    assert_eq!(step, "checker configuration");
    assert!(matches!(source, ImportError::UnsupportedInteractor));
}

#[tokio::test]
async fn submit_answer_problem() {
    let dir = package("type: submit-answer\n");
    let snapshot = import(dir.path()).await.unwrap();
    assert_eq!(snapshot.problem.kind, ProblemKind::Output);
}

fn replace_secret(root: &Path, files: &[&str]) {
    let secret = root.join("data/secret");
    std::fs::remove_dir_all(&secret).unwrap();
    for file in files {
        put(&secret, file, format!("{file}\n"));
    }
}

#[tokio::test]
async fn secret_group_named_sample_joins_the_samples() {
    let dir = package(PROBLEM_YAML);
    replace_secret(
        dir.path(),
        &["sample/a.in", "sample/a.ans", "sample/b.in", "sample/b.ans", "g1/01.in", "g1/01.ans"],
    );

    let snapshot = import(dir.path()).await.unwrap();
    assert_eq!(snapshot.testsets.len(), 2);

    let samples = &snapshot.testsets[0].id;
    let placement: Vec<_> = snapshot
        .tests
        .iter()
        .map(|test| (&test.testset_id == samples, test.index, test.example))
        .collect();
    assert_eq!(
        placement,
        vec![
            (true, 1, true),
            (true, 2, false),
            (true, 3, false),
            (false, 1, false),
        ]
    );
    assert_eq!(
        snapshot.tests.iter().map(|t| t.score).collect::<Vec<_>>(),
        vec![25.0, 25.0, 25.0, 25.0]
    );
    assert!(snapshot.tests[1].example_input_url.is_none());
}

#[tokio::test]
async fn sample_like_secret_groups_share_testset_zero() {
    let dir = package(PROBLEM_YAML);
    replace_secret(
        dir.path(),
        &["Samples/1.in", "Samples/1.ans", "2/1.in", "2/1.ans", "10/1.in", "10/1.ans"],
    );

    let snapshot = import(dir.path()).await.unwrap();
    let indices: Vec<u32> = snapshot.testsets.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let in_zero: Vec<bool> = snapshot
        .tests
        .iter()
        .filter(|test| test.testset_id == snapshot.testsets[0].id)
        .map(|test| test.example)
        .collect();
    assert_eq!(in_zero, vec![true, false]);
    assert_eq!(snapshot.tests.len(), 4);
}
