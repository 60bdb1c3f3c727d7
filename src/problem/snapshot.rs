//! The canonical, format-agnostic problem model handed to the judging platform.
//!
//! Every importer produces exactly one [`Snapshot`] per package. Values are built once during
//! normalization and never mutated afterwards.

use crate::problem::program::{File, Program};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub problem: Problem,
    pub testing: TestingConfig,
    pub checker: Option<Checker>,
    pub validator: Option<Program>,
    pub interactor: Option<Program>,
    pub statements: Vec<Statement>,
    pub templates: Vec<Template>,
    pub attachments: Vec<Attachment>,
    pub testsets: Vec<Testset>,
    pub tests: Vec<Test>,
    pub editorials: Vec<Editorial>,
    pub solutions: Vec<Solution>,
    pub scripts: Vec<Script>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub topics: Vec<String>,
    pub kind: ProblemKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemKind {
    #[default]
    Program,
    Output,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingConfig {
    pub run_count: u32,
    pub interactive_followup: bool,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            run_count: 1,
            interactive_followup: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checker {
    Builtin(BuiltinChecker),
    Program(Program),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinChecker {
    pub kind: ComparisonKind,
    pub precision: u32,
    pub case_sensitive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonKind {
    Tokens,
    Lines,
}

impl Checker {
    pub fn tokens(precision: u32, case_sensitive: bool) -> Self {
        Checker::Builtin(BuiltinChecker {
            kind: ComparisonKind::Tokens,
            precision,
            case_sensitive,
        })
    }

    pub fn lines() -> Self {
        Checker::Builtin(BuiltinChecker {
            kind: ComparisonKind::Lines,
            precision: 0,
            case_sensitive: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub locale: String,
    pub title: String,
    pub author: String,
    pub content: Content,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Markdown(String),
    Html(String),
    Latex(String),
}

impl Content {
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Markdown(text) | Content::Html(text) | Content::Latex(text) => {
                text.is_empty()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editorial {
    pub locale: String,
    pub content: Content,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub runtime: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub link: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub runtime: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    pub runtime: String,
    pub source: String,
    pub kind: SolutionKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolutionKind {
    Correct,
    Incorrect,
    WrongAnswer,
    Timeout,
    TimeoutOrAccepted,
    Overflow,
    Failure,
    DontRun,
    Unset,
}

/// One scoring/limit group. Index 0 is reserved for samples.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testset {
    pub id: String,
    pub index: u32,
    pub cpu_limit_ms: u32,
    pub memory_limit_bytes: u64,
    pub file_size_limit_bytes: u64,
    pub scoring_mode: ScoringMode,
    pub feedback_policy: FeedbackPolicy,
    pub dependency_mode: DependencyMode,
    pub dependencies: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMode {
    Each,
    All,
    Worst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackPolicy {
    Complete,
    Icpc,
    IcpcExpanded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyMode {
    #[default]
    None,
    FirstPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub testset_id: String,
    pub index: u32,
    pub example: bool,
    pub score: f64,
    pub input: TestData,
    pub answer: TestData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_input_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_answer_url: Option<String>,
}

/// Where the judge takes test input or answer from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestData {
    Url(String),
    Generator(Generator),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub script_name: String,
    pub arguments: Vec<String>,
}

impl Generator {
    /// Produces the answer at judge time by running the reference solution.
    pub fn solution() -> Self {
        Self {
            script_name: "solution".to_string(),
            arguments: Vec::new(),
        }
    }

    /// Splits a command line such as `gen 10 5` into script name and arguments.
    pub fn from_command(command: &str) -> Self {
        let mut words = command.split(' ');
        let script_name = words.next().unwrap_or_default().to_string();
        Self {
            script_name,
            arguments: words.map(str::to_string).collect(),
        }
    }
}

impl TestData {
    pub fn url(&self) -> Option<&str> {
        match self {
            TestData::Url(url) => Some(url),
            TestData::Generator(_) => None,
        }
    }

    pub fn generator(&self) -> Option<&Generator> {
        match self {
            TestData::Url(_) => None,
            TestData::Generator(generator) => Some(generator),
        }
    }
}
