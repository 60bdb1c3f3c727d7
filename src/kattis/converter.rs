use crate::{
    catalog::{self, Catalog},
    errors::{ImportError, Result, StepContext},
    kattis::parser,
    loader::ProblemLoader,
    problem::{
        assets::{self, Slot, TestUploads},
        groups::{self, GroupIndices, Limits, SAMPLE_INDEX},
        latex,
        policy::FormatPolicy,
        program::{File, Program},
        scoring,
        snapshot::{
            Attachment, Checker, Content, Editorial, FeedbackPolicy, Generator, Problem,
            ProblemKind, ScoringMode, Script, Snapshot, Solution, SolutionKind, Statement, Test,
            TestData, TestingConfig, Testset,
        },
    },
    upload::Uploader,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 1.0;
pub const DEFAULT_MEMORY_LIMIT_MIB: u64 = 2048;
pub const DEFAULT_OUTPUT_LIMIT_MIB: u64 = 512;
pub const DEFAULT_VALIDATION_PASSES: u32 = 2;

/// Loads unpacked Kattis packages, the ones with `problem.yaml` at the root.
pub struct KattisLoader {
    uploader: Uploader,
    catalog: Arc<Catalog>,
    policy: FormatPolicy,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ImportError + '_ {
    move |source| ImportError::io(path, source)
}

/// Regular files under `dir` at any depth, sorted by path. A missing directory yields nothing.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| ImportError::io(dir, err.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn solution_kind(verdict: &str) -> SolutionKind {
    match verdict {
        "accepted" | "reference" => SolutionKind::Correct,
        "wrong_answer" => SolutionKind::WrongAnswer,
        "rejected" => SolutionKind::Incorrect,
        "time_limit_exceeded" => SolutionKind::Timeout,
        "time_limit_exceeded_or_accepted" => SolutionKind::TimeoutOrAccepted,
        "memory_limit_exceeded" => SolutionKind::Overflow,
        "runtime_error" | "failed" => SolutionKind::Failure,
        _ => SolutionKind::DontRun,
    }
}

/// Built-in comparison described by legacy `validator_flags`, e.g. `float_tolerance 1e-6`.
fn flags_checker(flags: &str) -> Option<Checker> {
    let words: Vec<&str> = flags.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let case_sensitive = words.contains(&"case_sensitive");
    let mut precision = 0;
    for pair in words.windows(2) {
        if !matches!(
            pair[0],
            "float_tolerance" | "float_relative_tolerance" | "float_absolute_tolerance"
        ) {
            continue;
        }
        match pair[1].parse::<f64>() {
            Ok(tolerance) if tolerance > 0.0 && tolerance < 1.0 => {
                precision = precision.max((-tolerance.log10()).round() as u32);
            }
            _ => warn!(flag = pair[0], value = pair[1], "ignoring unusable tolerance"),
        }
    }

    Some(Checker::tokens(precision, case_sensitive))
}

/// Locale of a statement file named `problem.<xx>.<ext>` or `<xx>.<ext>`.
fn statement_locale(name: &str) -> String {
    let parts: Vec<&str> = name.split('.').collect();
    let locale = match parts.as_slice() {
        [_, locale, _] if locale.len() == 2 => *locale,
        [locale, _] if locale.len() == 2 => *locale,
        _ => "en",
    };
    locale.to_lowercase()
}

impl KattisLoader {
    pub fn new(uploader: Uploader, catalog: Arc<Catalog>) -> Self {
        Self {
            uploader,
            catalog,
            policy: FormatPolicy::KATTIS,
        }
    }

    /// Archives are often packed with a top-level directory; look inside it if it is the only one.
    async fn resolve_root(&self, root: &Path) -> Result<PathBuf> {
        if assets::is_file(&root.join("problem.yaml")).await {
            return Ok(root.to_path_buf());
        }

        let dirs = assets::list_dirs(root).await.map_err(io_error(root))?;
        if let [only] = dirs.as_slice() {
            if assets::is_file(&only.join("problem.yaml")).await {
                info!(root = %only.display(), "descending into the only directory of the archive");
                return Ok(only.clone());
            }
        }

        Ok(root.to_path_buf())
    }

    async fn manifest(&self, root: &Path) -> Result<parser::Specification> {
        let path = root.join("problem.yaml");
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ImportError::ManifestMissing { path, source })?;
        let text = String::from_utf8(data).map_err(|_| ImportError::ManifestInvalid {
            manifest: "problem.yaml",
            message: "invalid encoding".to_string(),
        })?;
        let spec = parser::parse_problem_yaml(&text)?;
        info!("problem.yaml successfully parsed");
        Ok(spec)
    }

    fn runtime_of_file(&self, path: &Path) -> Option<&str> {
        let language = self
            .catalog
            .language_of_extension(&assets::extension(path))?;
        self.catalog.runtime_of_language(language)
    }

    /// `.h` files next to a C or C++ program.
    async fn headers(&self, dir: &Path, runtime: &str, role: &str) -> Result<Vec<File>> {
        if !catalog::uses_headers(catalog::language_of_runtime(runtime)) {
            return Ok(Vec::new());
        }
        let headers = assets::list_files(dir)
            .await
            .map_err(io_error(dir))?
            .into_iter()
            .filter(|path| assets::extension(path) == "h")
            .collect();
        Ok(assets::helper_files(&self.uploader, headers, role).await)
    }

    /// The first file directly inside `dir` written in a known language.
    async fn program_in(&self, dir: &Path, role: &str) -> Result<Option<Program>> {
        for path in assets::list_files(dir).await.map_err(io_error(dir))? {
            let Some(runtime) = self.runtime_of_file(&path) else {
                debug!(%role, path = %path.display(), "skipping file in unknown language");
                continue;
            };

            let source = assets::read_text(&path).await.map_err(io_error(&path))?;
            let files = self.headers(dir, runtime, role).await?;

            info!(%role, %runtime, path = %path.display(), "adding program");
            return Ok(Some(Program::new(runtime, source).with_files(files)));
        }
        Ok(None)
    }

    async fn output_validator(&self, root: &Path) -> Result<Option<Program>> {
        let mut dirs = vec![root.join("output_validator")];
        let legacy = root.join("output_validators");
        dirs.push(legacy.clone());
        dirs.extend(assets::list_dirs(&legacy).await.map_err(io_error(&legacy))?);

        for dir in dirs {
            if let Some(program) = self.program_in(&dir, "checker").await? {
                return Ok(Some(program));
            }
        }
        Ok(None)
    }

    /// Resolves the checker and, for interactive problems, the interactor. Both come from the
    /// output validator; an interactive problem has no separate checker.
    async fn checker(
        &self,
        root: &Path,
        spec: &parser::Specification,
    ) -> Result<(Option<Checker>, Option<Program>)> {
        let program = self.output_validator(root).await?;

        if spec.is_interactive() {
            return match program {
                Some(program) => Ok((None, Some(program))),
                None => Err(ImportError::UnsupportedInteractor),
            };
        }

        if let Some(program) = program {
            return Ok((Some(Checker::Program(program)), None));
        }

        if let Some(checker) = flags_checker(&spec.validator_flags.0) {
            info!(flags = %spec.validator_flags.0, ?checker, "adding checker from validator flags");
            return Ok((Some(checker), None));
        }

        Ok((Some(self.policy.missing_checker("default")?), None))
    }

    async fn validator(&self, root: &Path) -> Result<Option<Program>> {
        for name in ["input_validators", "input_validator"] {
            if let Some(program) = self.program_in(&root.join(name), "validator").await? {
                return Ok(Some(program));
            }
        }
        Ok(None)
    }

    async fn statements(&self, root: &Path, spec: &parser::Specification) -> Result<Vec<Statement>> {
        let mut dir = root.join("statement");
        if !assets::is_dir(&dir).await {
            dir = root.join("problem_statement");
        }

        let author = spec.author().to_string();
        let mut statements = Vec::new();

        for path in assets::list_files(&dir).await.map_err(io_error(&dir))? {
            let name = assets::file_name(&path);
            let extension = assets::extension(&path);
            let content = match extension.as_str() {
                "md" | "markdown" => {
                    Content::Markdown(assets::read_text(&path).await.map_err(io_error(&path))?)
                }
                "html" | "htm" => {
                    Content::Html(assets::read_text(&path).await.map_err(io_error(&path))?)
                }
                "tex" => {
                    let text = assets::read_text(&path).await.map_err(io_error(&path))?;
                    Content::Latex(latex::publish_images(&self.uploader, &dir, &text).await)
                }
                "pdf" => {
                    self.policy.unsupported_statement(&path, "pdf")?;
                    continue;
                }
                _ => {
                    debug!(%name, "skipping file in statement directory");
                    continue;
                }
            };

            let locale = statement_locale(&name);
            let title = spec
                .name
                .localized(&locale)
                .or_else(|| spec.name.preferred())
                .unwrap_or("Problem")
                .to_string();

            statements.push(Statement {
                locale,
                title,
                author: author.clone(),
                content,
            });
        }

        if statements.is_empty() {
            return Err(ImportError::NoStatements(dir));
        }
        Ok(statements)
    }

    async fn attachments(&self, root: &Path) -> Result<Vec<Attachment>> {
        let files = walk_files(&root.join("attachments"))?
            .into_iter()
            .map(|path| (assets::file_name(&path), path))
            .collect();

        Ok(assets::publish_files(&self.uploader, files, "attachment")
            .await
            .into_iter()
            .map(|(name, link)| Attachment { name, link })
            .collect())
    }

    async fn limits(&self, root: &Path, spec: &parser::Specification) -> Limits {
        let mut time_limit = spec.limits.time_limit;
        if time_limit.is_none() {
            // Legacy packages keep a precomputed limit in a separate file
            let path = root.join(".timelimit");
            if let Ok(text) = assets::read_text(&path).await {
                match text.trim().parse() {
                    Ok(seconds) => time_limit = Some(seconds),
                    Err(err) => error!(path = %path.display(), error = %err, "unable to parse time limit"),
                }
            }
        }

        let seconds = time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECONDS);
        Limits {
            cpu_limit_ms: (seconds * 1000.0).round() as u32,
            memory_limit_bytes: spec.limits.memory.unwrap_or(DEFAULT_MEMORY_LIMIT_MIB) << 20,
            file_size_limit_bytes: spec.limits.output.unwrap_or(DEFAULT_OUTPUT_LIMIT_MIB) << 20,
        }
    }

    async fn group_config(&self, dir: &Path) -> Result<Option<parser::TestGroupConfig>> {
        for name in ["test_group.yaml", "testdata.yaml"] {
            let path = dir.join(name);
            if !assets::is_file(&path).await {
                continue;
            }
            let text = assets::read_text(&path).await.map_err(io_error(&path))?;
            return parser::parse_test_group(&text).map(Some);
        }
        Ok(None)
    }

    async fn testing(
        &self,
        root: &Path,
        spec: &parser::Specification,
    ) -> Result<(Vec<Testset>, Vec<Test>)> {
        let data = root.join("data");
        let sample_dir = data.join("sample");
        let secret_dir = data.join("secret");

        if !assets::is_dir(&secret_dir).await {
            return Err(ImportError::MissingDirectory(secret_dir));
        }

        let mut sources: Vec<(String, PathBuf)> = assets::list_dirs(&secret_dir)
            .await
            .map_err(io_error(&secret_dir))?
            .into_iter()
            .map(|dir| (assets::file_name(&dir), dir))
            .collect();
        if sources.is_empty() {
            sources.push(("secret".to_string(), secret_dir.clone()));
        }
        let has_samples = assets::is_dir(&sample_dir).await;
        if has_samples {
            sources.push(("sample".to_string(), sample_dir.clone()));
        }

        let indices = GroupIndices::assign(sources.iter().map(|(name, _)| name.as_str()));
        // A secret group may share its name with data/sample, so one name can own several dirs
        let mut dirs: HashMap<&str, Vec<&Path>> = HashMap::new();
        for (name, dir) in &sources {
            dirs.entry(name.as_str()).or_default().push(dir.as_path());
        }
        let limits = self.limits(root, spec).await;

        let mut testsets = Vec::new();
        let mut tests = Vec::new();
        let mut uploads = TestUploads::new();

        for index in indices.distinct() {
            let mut testset = groups::testset(index, limits);
            let mut group_dirs: Vec<&Path> = indices
                .names_of(index)
                .flat_map(|name| dirs.get(name).into_iter().flatten().copied())
                .collect();
            group_dirs.sort_by_key(|dir| *dir != sample_dir.as_path());

            for dir in &group_dirs {
                let Some(config) = self.group_config(dir).await? else {
                    continue;
                };
                if config.full_feedback {
                    testset.feedback_policy = FeedbackPolicy::Complete;
                }
                if config.takes_minimum() {
                    testset.scoring_mode = ScoringMode::Worst;
                }
                break;
            }

            let mut next_index = 0;
            for dir in group_dirs {
                let example = has_samples && dir == sample_dir.as_path();
                let inputs = walk_files(dir)?
                    .into_iter()
                    .filter(|path| assets::extension(path) == "in");

                for input in inputs {
                    next_index += 1;
                    let slot = tests.len();
                    let answer = input.with_extension("ans");

                    let answer_data = if assets::is_file(&answer).await {
                        uploads.push(Slot::Answer(slot), answer);
                        TestData::Url(String::new())
                    } else {
                        TestData::Generator(Generator::solution())
                    };
                    uploads.push(Slot::Input(slot), input);

                    tests.push(Test {
                        testset_id: testset.id.clone(),
                        index: next_index,
                        example,
                        score: 0.0,
                        input: TestData::Url(String::new()),
                        answer: answer_data,
                        example_input_url: None,
                        example_answer_url: None,
                    });
                }
            }

            if index != SAMPLE_INDEX && next_index == 0 {
                warn!(testset = index, "testset has no tests");
            }
            testsets.push(testset);
        }

        info!(tests = tests.len(), files = uploads.len(), "uploading test data");
        uploads.run(&self.uploader, &mut tests).await?;

        for test in tests.iter_mut().filter(|test| test.example) {
            test.example_input_url = test.input.url().map(str::to_string);
            test.example_answer_url = test.answer.url().map(str::to_string);
        }
        scoring::distribute_scores(&mut tests);

        Ok((testsets, tests))
    }

    async fn editorials(&self, root: &Path) -> Result<Vec<Editorial>> {
        let dir = root.join("solution");
        let mut editorials = Vec::new();

        for path in assets::list_files(&dir).await.map_err(io_error(&dir))? {
            let name = assets::file_name(&path);
            if assets::extension(&path) != "tex" {
                debug!(%name, "skipping editorial in unsupported format");
                continue;
            }

            // solution.<language>.tex or solution.tex
            let locale = match name.split('.').collect::<Vec<_>>().as_slice() {
                [_, language, _] if language.len() == 2 => language.to_lowercase(),
                [_, language, _] => match self.catalog.locale(&language.to_lowercase()) {
                    Some(locale) => locale.to_string(),
                    None => {
                        info!(%name, %language, "skipping editorial in unsupported language");
                        continue;
                    }
                },
                _ => "en".to_string(),
            };

            let text = match assets::read_text(&path).await {
                Ok(text) => text,
                Err(err) => {
                    error!(%name, error = %err, "unable to read editorial");
                    continue;
                }
            };

            editorials.push(Editorial {
                locale,
                content: Content::Latex(latex::publish_images(&self.uploader, &dir, &text).await),
            });
        }

        Ok(editorials)
    }

    async fn solutions(&self, root: &Path) -> Result<Vec<Solution>> {
        let mut solutions = Vec::new();

        for path in walk_files(&root.join("submissions"))? {
            let verdict = path
                .parent()
                .map(assets::file_name)
                .unwrap_or_default();
            let Some(runtime) = self.runtime_of_file(&path) else {
                info!(path = %path.display(), "skipping submission in unknown language");
                continue;
            };

            match assets::read_text(&path).await {
                Ok(source) => solutions.push(Solution {
                    name: assets::file_name(&path),
                    runtime: runtime.to_string(),
                    source,
                    kind: solution_kind(&verdict),
                }),
                Err(err) => error!(path = %path.display(), error = %err, "unable to read submission"),
            }
        }

        Ok(solutions)
    }

    async fn scripts(&self, root: &Path) -> Result<Vec<Script>> {
        let mut scripts = Vec::new();

        for path in walk_files(&root.join("generators"))? {
            let extension = assets::extension(&path);
            if matches!(extension.as_str(), "txt" | "md" | "h") {
                continue;
            }

            let Some(runtime) = self.runtime_of_file(&path) else {
                info!(path = %path.display(), "skipping generator in unknown language");
                continue;
            };

            let source = match assets::read_text(&path).await {
                Ok(source) => source,
                Err(err) => {
                    error!(path = %path.display(), error = %err, "unable to read generator");
                    continue;
                }
            };

            let dir = path.parent().unwrap_or(root);
            scripts.push(Script {
                name: assets::file_stem(&path),
                runtime: runtime.to_string(),
                source,
                files: self.headers(dir, runtime, "script").await?,
            });
        }

        Ok(scripts)
    }
}

#[async_trait]
impl ProblemLoader for KattisLoader {
    async fn snapshot(&self, root: &Path) -> Result<Snapshot> {
        let root = self.resolve_root(root).await?;
        let root = root.as_path();
        let spec = self.manifest(root).await?;

        let (checker, interactor) = self
            .checker(root, &spec)
            .await
            .step("checker configuration")?;
        let validator = self.validator(root).await.step("validator configuration")?;
        let statements = self.statements(root, &spec).await.step("statements")?;
        let attachments = self.attachments(root).await.step("attachments")?;
        let (testsets, tests) = self.testing(root, &spec).await.step("tests")?;
        let editorials = self.editorials(root).await.step("editorials")?;
        let solutions = self.solutions(root).await.step("solutions")?;
        let scripts = self.scripts(root).await.step("scripts")?;

        let multi_pass = spec.is_multi_pass();
        let run_count = if multi_pass {
            spec.limits
                .validation_passes
                .unwrap_or(DEFAULT_VALIDATION_PASSES)
        } else {
            1
        };
        let kind = if spec.is_submit_answer() {
            ProblemKind::Output
        } else {
            ProblemKind::Program
        };

        info!(
            testsets = testsets.len(),
            tests = tests.len(),
            statements = statements.len(),
            "kattis package imported"
        );

        Ok(Snapshot {
            problem: Problem {
                topics: self.catalog.topics(spec.keywords.values()),
                kind,
            },
            testing: TestingConfig {
                run_count,
                interactive_followup: interactor.is_some() && multi_pass,
            },
            checker,
            validator,
            interactor,
            statements,
            templates: Vec::new(),
            attachments,
            testsets,
            tests,
            editorials,
            solutions,
            scripts,
        })
    }
}
