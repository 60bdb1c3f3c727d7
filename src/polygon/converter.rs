use crate::{
    catalog::{self, Catalog},
    errors::{ImportError, Result, StepContext},
    loader::ProblemLoader,
    polygon::{parser, testset},
    problem::{
        assets, latex,
        policy::FormatPolicy,
        program::{File, Program},
        snapshot::{
            Attachment, Checker, Content, Editorial, Problem, ProblemKind, Script, Snapshot,
            Solution, SolutionKind, Statement, Template, TestingConfig,
        },
    },
    upload::Uploader,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Loads unpacked Polygon packages, the ones with `problem.xml` at the root.
pub struct PolygonLoader {
    uploader: Uploader,
    catalog: Arc<Catalog>,
    policy: FormatPolicy,
}

fn builtin_checker(name: &str) -> Option<Checker> {
    match name {
        // Sequence of int64 or of tokens
        "std::ncmp.cpp" | "std::wcmp.cpp" => Some(Checker::tokens(0, true)),
        // Doubles with absolute or relative error
        "std::rcmp4.cpp" => Some(Checker::tokens(4, true)),
        "std::rcmp6.cpp" => Some(Checker::tokens(6, true)),
        "std::rcmp9.cpp" => Some(Checker::tokens(9, true)),
        "std::yesno.cpp" | "std::nyesno.cpp" => Some(Checker::tokens(0, false)),
        "std::fcmp.cpp" | "std::hcmp.cpp" | "std::lcmp.cpp" => Some(Checker::lines()),
        _ => None,
    }
}

fn solution_kind(tag: &str) -> Option<SolutionKind> {
    Some(match tag {
        "main" | "accepted" => SolutionKind::Correct,
        "rejected" => SolutionKind::Incorrect,
        "wrong-answer" => SolutionKind::WrongAnswer,
        "time-limit-exceeded" => SolutionKind::Timeout,
        "time-limit-exceeded-or-accepted" => SolutionKind::TimeoutOrAccepted,
        "memory-limit-exceeded" => SolutionKind::Overflow,
        "failed" => SolutionKind::Failure,
        "time-limit-exceeded-or-memory-limit-exceeded" | "presentation-error" => {
            SolutionKind::DontRun
        }
        _ => return None,
    })
}

async fn read_source(root: &Path, path: &str) -> Result<String> {
    let path = root.join(path);
    assets::read_text(&path)
        .await
        .map_err(|source| ImportError::io(path, source))
}

fn resources_where<'a>(
    root: &'a Path,
    problem: &'a parser::Problem,
    filter: impl Fn(&parser::Resource) -> bool + 'a,
) -> impl Iterator<Item = PathBuf> + 'a {
    problem
        .files
        .resources
        .list
        .iter()
        .filter(move |resource| filter(resource))
        .map(move |resource| root.join(&resource.path))
}

impl PolygonLoader {
    pub fn new(uploader: Uploader, catalog: Arc<Catalog>) -> Self {
        Self {
            uploader,
            catalog,
            policy: FormatPolicy::POLYGON,
        }
    }

    async fn manifest(&self, root: &Path) -> Result<parser::Problem> {
        let path = root.join("problem.xml");
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ImportError::ManifestMissing { path, source })?;
        let problem_xml =
            String::from_utf8(data).map_err(|_| ImportError::ManifestInvalid {
                manifest: "problem.xml",
                message: "invalid encoding".to_string(),
            })?;
        let problem = parser::parse_problem_xml(&problem_xml)?;
        info!("problem.xml successfully parsed");
        Ok(problem)
    }

    /// The first source with a known runtime, with every resource tagged for `role` attached.
    async fn program(
        &self,
        root: &Path,
        problem: &parser::Problem,
        sources: &[parser::Source],
        role: &str,
    ) -> Result<Option<Program>> {
        for source in sources {
            let Some(runtime) = self.catalog.polygon_runtime(&source.type_) else {
                continue;
            };

            let text = read_source(root, &source.path).await?;
            let helpers = resources_where(root, problem, |resource| resource.is_asset(role)).collect();
            let files = assets::helper_files(&self.uploader, helpers, role).await;

            info!(%role, %runtime, "adding program");
            return Ok(Some(Program::new(runtime, text).with_files(files)));
        }
        Ok(None)
    }

    async fn checker(&self, root: &Path, problem: &parser::Problem) -> Result<Checker> {
        let checker = &problem.assets.checker;
        if let Some(builtin) = builtin_checker(&checker.name) {
            info!(checker = %checker.name, ?builtin, "adding built-in checker");
            return Ok(builtin);
        }

        match self.program(root, problem, &checker.sources, "checker").await? {
            Some(program) => Ok(Checker::Program(program)),
            None => self.policy.missing_checker(&checker.name),
        }
    }

    async fn validator(&self, root: &Path, problem: &parser::Problem) -> Result<Option<Program>> {
        for validator in &problem.assets.validators.list {
            if let Some(program) = self
                .program(root, problem, &validator.sources, "validator")
                .await?
            {
                return Ok(Some(program));
            }
        }
        Ok(None)
    }

    async fn interactor(&self, root: &Path, problem: &parser::Problem) -> Result<Option<Program>> {
        let sources = match &problem.assets.interactor {
            Some(interactor) if !interactor.sources.is_empty() => &interactor.sources,
            _ => return Ok(None),
        };

        match self.program(root, problem, sources, "interactor").await? {
            Some(program) => Ok(Some(program)),
            None => Err(ImportError::UnsupportedInteractor),
        }
    }

    async fn statements(&self, root: &Path, problem: &parser::Problem) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        for statement in &problem.statements.list {
            let path = root.join(&statement.path);
            if !statement.is_tex() {
                self.policy.unsupported_statement(&path, &statement.type_)?;
                continue;
            }

            let Some(locale) = self.catalog.locale(&statement.language) else {
                info!(path = %statement.path, language = %statement.language, "skipping statement in unsupported language");
                continue;
            };

            let dir = path.parent().unwrap_or(root);
            let properties_path = dir.join("problem-properties.json");
            let properties: parser::ProblemProperties =
                match assets::read_text(&properties_path).await {
                    Ok(text) => match serde_json::from_str(&text) {
                        Ok(properties) => properties,
                        Err(err) => {
                            error!(path = %properties_path.display(), error = %err, "unable to decode problem properties");
                            continue;
                        }
                    },
                    Err(err) => {
                        error!(path = %statement.path, error = %err, "unable to read statement");
                        continue;
                    }
                };

            let content = latex::publish_images(&self.uploader, dir, &properties.latex()).await;
            let title = if properties.name.is_empty() {
                problem
                    .name_in(&statement.language)
                    .unwrap_or_default()
                    .to_string()
            } else {
                properties.name
            };

            statements.push(Statement {
                locale: locale.to_string(),
                title,
                author: properties.author_name,
                content: Content::Latex(content),
            });
        }

        Ok(statements)
    }

    async fn editorials(&self, root: &Path, problem: &parser::Problem) -> Result<Vec<Editorial>> {
        let mut editorials = Vec::new();

        for tutorial in &problem.tutorials.list {
            if !tutorial.is_tex() {
                info!(path = %tutorial.path, format = %tutorial.type_, "skipping tutorial in unsupported format");
                continue;
            }

            let Some(locale) = self.catalog.locale(&tutorial.language) else {
                info!(path = %tutorial.path, language = %tutorial.language, "skipping tutorial in unsupported language");
                continue;
            };

            let path = root.join(&tutorial.path);
            let text = match assets::read_text(&path).await {
                Ok(text) => text,
                Err(err) => {
                    error!(path = %tutorial.path, error = %err, "unable to read tutorial");
                    continue;
                }
            };

            let dir = path.parent().unwrap_or(root);
            editorials.push(Editorial {
                locale: locale.to_string(),
                content: Content::Latex(latex::publish_images(&self.uploader, dir, &text).await),
            });
        }

        Ok(editorials)
    }

    async fn templates(&self, root: &Path, problem: &parser::Problem) -> Result<Vec<Template>> {
        let mut templates = Vec::new();

        for (language, runtimes) in self.catalog.templates() {
            let Some(extension) = self.catalog.extension_of_language(language) else {
                continue;
            };

            let file_name = if language == "python" {
                "template_py.py".to_string()
            } else {
                format!("template_{language}.{extension}")
            };
            let path = root.join("files").join(file_name);
            let source = match assets::read_text(&path).await {
                Ok(source) => source,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(err) => return Err(ImportError::io(path, err)),
            };

            let for_types = format!("{language}.*");
            let extra = resources_where(root, problem, |resource| {
                resource.for_types == for_types && resource.is_asset("solution")
            })
            .map(|path| (assets::file_name(&path), path))
            .collect();
            let files: Vec<File> = assets::publish_files(&self.uploader, extra, "template")
                .await
                .into_iter()
                .map(|(path, source_url)| File { path, source_url })
                .collect();

            if files.is_empty() && source.is_empty() {
                continue;
            }

            for runtime in runtimes {
                templates.push(Template {
                    runtime: runtime.clone(),
                    source: source.clone(),
                    files: files.clone(),
                });
            }
        }

        templates.sort_by(|a, b| a.runtime.cmp(&b.runtime));
        Ok(templates)
    }

    async fn attachments(&self, root: &Path, problem: &parser::Problem) -> Vec<Attachment> {
        let mut files: Vec<(String, PathBuf)> = problem
            .materials
            .list
            .iter()
            .filter(|material| material.publish == "with-statement")
            .map(|material| {
                let path = root.join(&material.path);
                (assets::file_name(&path), path)
            })
            .collect();

        files.extend(
            resources_where(root, problem, |resource| {
                assets::file_name(Path::new(&resource.path)).starts_with("pub_")
            })
            .map(|path| {
                let name = assets::file_name(&path);
                let name = name.strip_prefix("pub_").unwrap_or(&name).to_string();
                (name, path)
            }),
        );

        assets::publish_files(&self.uploader, files, "attachment")
            .await
            .into_iter()
            .map(|(name, link)| Attachment { name, link })
            .collect()
    }

    async fn solutions(&self, root: &Path, problem: &parser::Problem) -> Vec<Solution> {
        let mut solutions = Vec::new();

        for solution in &problem.assets.solutions.list {
            let source = &solution.source;
            let Some(runtime) = self.catalog.polygon_runtime(&source.type_) else {
                warn!(path = %source.path, runtime = %source.type_, "skipping solution because its runtime is not mapped");
                continue;
            };
            let Some(kind) = solution_kind(&solution.tag) else {
                warn!(path = %source.path, tag = %solution.tag, "skipping solution because its tag is not mapped");
                continue;
            };

            match read_source(root, &source.path).await {
                Ok(text) => solutions.push(Solution {
                    name: assets::file_name(Path::new(&source.path)),
                    runtime: runtime.to_string(),
                    source: text,
                    kind,
                }),
                Err(err) => error!(error = %err, "unable to read solution"),
            }
        }

        solutions
    }

    async fn scripts(&self, root: &Path, problem: &parser::Problem) -> Vec<Script> {
        let mut scripts = Vec::new();

        for executable in &problem.files.executables.list {
            let source = &executable.source;
            let Some(runtime) = self.catalog.polygon_runtime(&source.type_) else {
                warn!(path = %source.path, runtime = %source.type_, "skipping script because its runtime is not mapped");
                continue;
            };

            let text = match read_source(root, &source.path).await {
                Ok(text) => text,
                Err(err) => {
                    error!(error = %err, "unable to read script");
                    continue;
                }
            };

            let files = if catalog::uses_headers(catalog::language_of_runtime(runtime)) {
                let headers = resources_where(root, problem, |resource| {
                    assets::extension(Path::new(&resource.path)) == "h"
                })
                .collect();
                assets::helper_files(&self.uploader, headers, "script").await
            } else {
                Vec::new()
            };

            scripts.push(Script {
                name: assets::file_stem(Path::new(&source.path)),
                runtime: runtime.to_string(),
                source: text,
                files,
            });
        }

        // Answers missing from the package are generated by the main solution
        for solution in problem
            .assets
            .solutions
            .list
            .iter()
            .filter(|solution| solution.tag == "main")
        {
            let Some(runtime) = self.catalog.polygon_runtime(&solution.source.type_) else {
                error!(runtime = %solution.source.type_, "unable to create solution script because its runtime is not mapped");
                continue;
            };

            let text = match read_source(root, &solution.source.path).await {
                Ok(text) => text,
                Err(err) => {
                    error!(error = %err, "unable to read solution script");
                    continue;
                }
            };

            let helpers =
                resources_where(root, problem, |resource| resource.is_asset("solution")).collect();
            scripts.push(Script {
                name: "solution".to_string(),
                runtime: runtime.to_string(),
                source: text,
                files: assets::helper_files(&self.uploader, helpers, "solution").await,
            });
        }

        scripts
    }
}

#[async_trait]
impl ProblemLoader for PolygonLoader {
    async fn snapshot(&self, root: &Path) -> Result<Snapshot> {
        let problem = self.manifest(root).await?;

        let checker = self.checker(root, &problem).await.step("checker configuration")?;
        let validator = self
            .validator(root, &problem)
            .await
            .step("validator configuration")?;
        let interactor = self
            .interactor(root, &problem)
            .await
            .step("interactor configuration")?;
        let statements = self.statements(root, &problem).await.step("statements")?;
        let templates = self.templates(root, &problem).await.step("templates")?;
        let attachments = self.attachments(root, &problem).await;
        let (testsets, tests) = testset::import_testing(&self.uploader, root, &problem)
            .await
            .step("tests")?;
        let editorials = self.editorials(root, &problem).await.step("tutorials")?;
        let solutions = self.solutions(root, &problem).await;
        let scripts = self.scripts(root, &problem).await;

        let run_count = problem.judging.run_count.filter(|&runs| runs > 0).unwrap_or(1);
        let interactive_followup = problem
            .assets
            .interactor
            .as_ref()
            .map_or(false, |interactor| interactor.runs.list.len() > 1);
        let kind = if problem.tagged("output-only") {
            ProblemKind::Output
        } else {
            ProblemKind::Program
        };

        info!(
            testsets = testsets.len(),
            tests = tests.len(),
            statements = statements.len(),
            "polygon package imported"
        );

        Ok(Snapshot {
            problem: Problem {
                topics: self.catalog.topics(problem.tag_values()),
                kind,
            },
            testing: TestingConfig {
                run_count,
                interactive_followup,
            },
            checker: Some(checker),
            validator,
            interactor,
            statements,
            templates,
            attachments,
            testsets,
            tests,
            editorials,
            solutions,
            scripts,
        })
    }
}
