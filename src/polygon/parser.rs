//! Typed view of a Polygon `problem.xml`.

use crate::errors::{ImportError, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Problem {
    pub names: Names,
    pub statements: Statements,
    pub tutorials: Tutorials,
    pub judging: Judging,
    pub files: Files,
    pub assets: Assets,
    pub materials: Materials,
    pub tags: Tags,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Names {
    #[serde(rename = "name")]
    pub list: Vec<Name>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Name {
    pub language: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Statements {
    #[serde(rename = "statement")]
    pub list: Vec<Statement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tutorials {
    #[serde(rename = "tutorial")]
    pub list: Vec<Statement>,
}

/// A statement or tutorial file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Statement {
    pub charset: String,
    pub language: String,
    pub path: String,
    #[serde(rename = "type")]
    pub type_: String,
}

pub const TEX: &str = "application/x-tex";

impl Statement {
    pub fn is_tex(&self) -> bool {
        self.type_ == TEX
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Judging {
    pub input_file: String,
    pub output_file: String,
    pub run_count: Option<u32>,
    #[serde(rename = "testset")]
    pub testsets: Vec<TestSet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TestSet {
    pub name: String,
    pub time_limit: u32,   // ms
    pub memory_limit: u64, // bytes
    pub test_count: usize,
    pub input_path_pattern: String,  // C-style format string
    pub answer_path_pattern: String, // C-style format string
    pub tests: Tests,
    pub groups: Groups,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tests {
    #[serde(rename = "test")]
    pub list: Vec<Test>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Test {
    pub method: String,
    pub group: String,
    pub cmd: String,
    pub points: f64,
    pub sample: bool,
}

impl Test {
    pub fn is_generated(&self) -> bool {
        self.method == "generated"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Groups {
    #[serde(rename = "group")]
    pub list: Vec<Group>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Group {
    pub name: String,
    pub feedback_policy: String,
    pub points: f64,
    pub points_policy: String,
    pub dependencies: Dependencies,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    #[serde(rename = "dependency")]
    pub list: Vec<Dependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dependency {
    pub group: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Files {
    pub resources: Resources,
    pub executables: Executables,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Resources {
    #[serde(rename = "file")]
    pub list: Vec<Resource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Resource {
    pub path: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub for_types: String,
    pub assets: ResourceAssets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceAssets {
    #[serde(rename = "asset")]
    pub list: Vec<ResourceAsset>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceAsset {
    pub name: String,
}

impl Resource {
    /// Whether the resource is tagged with `<asset name="..."/>` for the given role.
    pub fn is_asset(&self, role: &str) -> bool {
        self.assets
            .list
            .iter()
            .any(|asset| asset.name.eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Executables {
    #[serde(rename = "executable")]
    pub list: Vec<Executable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Executable {
    pub source: Source,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Assets {
    pub checker: Checker,
    pub interactor: Option<Interactor>,
    pub validators: Validators,
    pub solutions: Solutions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Checker {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(rename = "source")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Interactor {
    #[serde(rename = "source")]
    pub sources: Vec<Source>,
    pub runs: Runs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Runs {
    #[serde(rename = "run")]
    pub list: Vec<Run>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Run {
    #[serde(rename = "$value")]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Validators {
    #[serde(rename = "validator")]
    pub list: Vec<Validator>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Validator {
    #[serde(rename = "source")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Solutions {
    #[serde(rename = "solution")]
    pub list: Vec<Solution>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Solution {
    pub tag: String,
    pub source: Source,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source {
    pub path: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Materials {
    #[serde(rename = "material")]
    pub list: Vec<Material>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Material {
    pub path: String,
    pub publish: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tags {
    #[serde(rename = "tag")]
    pub list: Vec<Tag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub value: String,
}

impl Problem {
    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.list.iter().any(|t| t.value == tag)
    }

    pub fn tag_values(&self) -> impl Iterator<Item = &str> {
        self.tags.list.iter().map(|tag| tag.value.as_str())
    }

    /// The testset called `tests`, or the first one.
    pub fn main_testset(&self) -> Option<&TestSet> {
        self.judging
            .testsets
            .iter()
            .find(|testset| testset.name.eq_ignore_ascii_case("tests"))
            .or_else(|| self.judging.testsets.first())
    }

    pub fn name_in(&self, language: &str) -> Option<&str> {
        self.names
            .list
            .iter()
            .find(|name| name.language == language)
            .map(|name| name.value.as_str())
    }
}

/// Contents of the `problem-properties.json` placed next to every statement.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemProperties {
    pub language: String,
    pub name: String,
    pub legend: String,
    pub input: String,
    pub interaction: String,
    pub output: String,
    pub notes: String,
    pub scoring: String,
    pub author_login: String,
    pub author_name: String,
}

impl ProblemProperties {
    /// Statement body assembled from its sections.
    pub fn latex(&self) -> String {
        let mut parts = vec![self.legend.clone()];
        for (heading, section) in [
            ("\\InputFile", &self.input),
            ("\\Interaction", &self.interaction),
            ("\\OutputFile", &self.output),
            ("\\Note", &self.notes),
            ("\\Scoring", &self.scoring),
        ] {
            if !section.is_empty() {
                parts.push(format!("{heading}\n\n{section}"));
            }
        }
        parts.join("\n\n")
    }
}

pub fn parse_problem_xml(problem_xml: &str) -> Result<Problem> {
    serde_xml_rs::from_str(problem_xml).map_err(|error| ImportError::ManifestInvalid {
        manifest: "problem.xml",
        message: error.to_string(),
    })
}
