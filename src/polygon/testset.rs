use crate::{
    errors::{ImportError, Result},
    polygon::parser,
    problem::{
        assets::{self, Slot, TestUploads},
        groups::{self, GroupIndices, Limits, SAMPLE_INDEX},
        scoring,
        snapshot::{
            DependencyMode, FeedbackPolicy, Generator, ScoringMode, Test, TestData, Testset,
        },
    },
    upload::Uploader,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const FILE_SIZE_LIMIT: u64 = 536870912;

pub struct FileNamePattern<'a> {
    before: &'a str,
    after: &'a str,
    padding: usize,
}

fn invalid(pattern: &str, reason: &str) -> ImportError {
    ImportError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

impl<'a> FileNamePattern<'a> {
    pub fn from_printf_format(pattern: &'a str) -> Result<Self> {
        if
        // Access to parent directory may lead to escaping the package
        pattern.contains("/../")
            || pattern.starts_with("../")
            || pattern.ends_with("/..")
            // Absolute path
            || pattern.starts_with('/')
            // OS-dependent path separator
            || pattern.contains('\\')
            // Absolute path (C:/...) or NTFS alternate stream
            || pattern.contains(':')
        {
            return Err(invalid(
                pattern,
                "it must be a relative path, and not contain /../, \\, or :",
            ));
        }

        let exactly_one = "it must contain exactly one %d pattern";
        let pat_start_idx = pattern.find('%').ok_or_else(|| invalid(pattern, exactly_one))?;
        let before = &pattern[..pat_start_idx];
        let pat_end_idx = pat_start_idx
            + pattern[pat_start_idx..]
                .find('d')
                .ok_or_else(|| invalid(pattern, exactly_one))?
            + 1;
        let after = &pattern[pat_end_idx..];
        if after.contains('%') {
            return Err(invalid(pattern, exactly_one));
        }

        let pat = &pattern[pat_start_idx..pat_end_idx];
        let mut padding = 0;

        if pat.len() > 2 {
            let either = "the pattern must be either %d or %0<number>d";
            if pat.as_bytes()[1] != b'0' {
                return Err(invalid(pattern, either));
            }
            padding = pat[2..pat.len() - 1]
                .parse()
                .map_err(|_| invalid(pattern, either))?;
        }

        if padding >= 128 {
            return Err(invalid(
                pattern,
                "the length of padding in the %0<number>d pattern must not exceed 127",
            ));
        }

        Ok(Self {
            before,
            after,
            padding,
        })
    }

    pub fn format(&self, number: usize) -> String {
        format!(
            "{}{:0padding$}{}",
            self.before,
            number,
            self.after,
            padding = self.padding
        )
    }
}

/// Limit overrides and scoring switches carried by package tags.
#[derive(Debug, Default, PartialEq, Eq)]
struct TagOverrides {
    block_min: bool,
    time_limit: Option<u32>,
    memory_limit: Option<u64>,
}

fn tag_overrides<'a>(tags: impl IntoIterator<Item = &'a str>) -> TagOverrides {
    let mut overrides = TagOverrides::default();
    for tag in tags {
        if tag == "block_min" || tag == "min_block" {
            info!("found block_min tag, switching to min scoring and first point dependency mode");
            overrides.block_min = true;
        } else if let Some(value) = tag.strip_prefix("eolymp_tl=") {
            match value.parse() {
                Ok(ms) => {
                    info!(ms, "overriding time limit");
                    overrides.time_limit = Some(ms);
                }
                Err(err) => error!(%tag, error = %err, "unable to parse time limit tag"),
            }
        } else if let Some(value) = tag.strip_prefix("eolymp_ml=") {
            match value.parse() {
                Ok(bytes) => {
                    info!(bytes, "overriding memory limit");
                    overrides.memory_limit = Some(bytes);
                }
                Err(err) => error!(%tag, error = %err, "unable to parse memory limit tag"),
            }
        }
    }
    overrides
}

/// Group names of a testset: declarations, their dependencies and the groups tests refer to.
fn group_names(testset: &parser::TestSet) -> Vec<&str> {
    let mut names = Vec::new();
    for group in &testset.groups.list {
        names.push(group.name.as_str());
        names.extend(group.dependencies.list.iter().map(|dep| dep.group.as_str()));
    }
    names.extend(testset.tests.list.iter().map(|test| test.group.as_str()));
    names
}

fn build_testsets(
    testset: &parser::TestSet,
    indices: &GroupIndices,
    limits: Limits,
    block_min: bool,
) -> Vec<Testset> {
    let declared: HashMap<&str, &parser::Group> = testset
        .groups
        .list
        .iter()
        .map(|group| (group.name.as_str(), group))
        .collect();

    indices
        .distinct()
        .into_iter()
        .map(|index| {
            let mut built = groups::testset(index, limits);

            if let Some(group) = indices
                .names_of(index)
                .find_map(|name| declared.get(name).copied())
            {
                built.scoring_mode = if group.points_policy == "complete-group" {
                    ScoringMode::All
                } else {
                    ScoringMode::Each
                };
                built.feedback_policy = match group.feedback_policy.as_str() {
                    "icpc" | "points" | "none" => FeedbackPolicy::Icpc,
                    "icpc-expanded" => FeedbackPolicy::IcpcExpanded,
                    _ => FeedbackPolicy::Complete,
                };
                built.dependencies = indices.dependencies(
                    index,
                    group.dependencies.list.iter().map(|dep| dep.group.as_str()),
                );
            }

            if block_min && index != SAMPLE_INDEX {
                built.scoring_mode = ScoringMode::Worst;
                built.dependency_mode = DependencyMode::FirstPoint;
            }

            built
        })
        .collect()
}

/// Directories next to TeX statements, where Polygon keeps `example.NN` copies of sample tests.
fn statement_dirs(root: &Path, problem: &parser::Problem) -> Vec<PathBuf> {
    problem
        .statements
        .list
        .iter()
        .filter(|statement| statement.is_tex())
        .map(|statement| root.join(&statement.path))
        .filter_map(|path| path.parent().map(Path::to_path_buf))
        .collect()
}

async fn find_samples(dirs: &[PathBuf], number: usize) -> (Option<PathBuf>, Option<PathBuf>) {
    let mut input = None;
    let mut answer = None;
    for dir in dirs {
        let candidate = dir.join(format!("example.{number:02}"));
        if input.is_none() && assets::is_file(&candidate).await {
            input = Some(candidate);
        }
        let candidate = dir.join(format!("example.{number:02}.a"));
        if answer.is_none() && assets::is_file(&candidate).await {
            answer = Some(candidate);
        }
        if input.is_some() && answer.is_some() {
            break;
        }
    }
    (input, answer)
}

/// Builds testsets and tests of the main testset, uploading every test file.
pub async fn import_testing(
    uploader: &Uploader,
    root: &Path,
    problem: &parser::Problem,
) -> Result<(Vec<Testset>, Vec<Test>)> {
    let polyset = match problem.main_testset() {
        Some(polyset) => polyset,
        None => {
            warn!("package has no testsets");
            return Ok((Vec::new(), Vec::new()));
        }
    };

    info!(testset = %polyset.name, "importing testset");

    if polyset.test_count != polyset.tests.list.len() {
        warn!(
            declared = polyset.test_count,
            listed = polyset.tests.list.len(),
            "number of tests does not agree with the reported count"
        );
    }

    let overrides = tag_overrides(problem.tag_values());
    let limits = Limits {
        cpu_limit_ms: overrides.time_limit.unwrap_or(polyset.time_limit),
        memory_limit_bytes: overrides.memory_limit.unwrap_or(polyset.memory_limit),
        file_size_limit_bytes: FILE_SIZE_LIMIT,
    };

    let indices = GroupIndices::assign(group_names(polyset));
    let testsets = build_testsets(polyset, &indices, limits, overrides.block_min);
    let ids: HashMap<u32, &str> = testsets
        .iter()
        .map(|testset| (testset.index, testset.id.as_str()))
        .collect();

    let input_pattern = FileNamePattern::from_printf_format(&polyset.input_path_pattern)?;
    let answer_pattern = FileNamePattern::from_printf_format(&polyset.answer_path_pattern)?;
    let sample_dirs = statement_dirs(root, problem);

    let mut tests = Vec::new();
    let mut uploads = TestUploads::new();
    let mut next_index: HashMap<u32, u32> = HashMap::new();

    for (position, polytest) in polyset.tests.list.iter().enumerate() {
        let number = position + 1;
        let Some(testset_index) = indices.get(&polytest.group) else {
            error!(test = number, group = %polytest.group, "skipping test whose group is not mapped");
            continue;
        };
        let index = next_index.entry(testset_index).or_insert(0);
        *index += 1;

        let slot = tests.len();
        let mut test = Test {
            testset_id: ids[&testset_index].to_string(),
            index: *index,
            example: polytest.sample,
            score: polytest.points,
            input: TestData::Url(String::new()),
            answer: TestData::Url(String::new()),
            example_input_url: None,
            example_answer_url: None,
        };

        let input = root.join(input_pattern.format(number));
        if polytest.is_generated() && !assets::is_file(&input).await {
            test.input = TestData::Generator(Generator::from_command(&polytest.cmd));
        } else {
            uploads.push(Slot::Input(slot), input);
        }

        let answer = root.join(answer_pattern.format(number));
        if assets::is_file(&answer).await {
            uploads.push(Slot::Answer(slot), answer);
        } else {
            test.answer = TestData::Generator(Generator::solution());
        }

        if polytest.sample {
            let (input, answer) = find_samples(&sample_dirs, number).await;
            if let Some(input) = input {
                uploads.push(Slot::ExampleInput(slot), input);
            }
            if let Some(answer) = answer {
                uploads.push(Slot::ExampleAnswer(slot), answer);
            }
        }

        tests.push(test);
    }

    info!(tests = tests.len(), files = uploads.len(), "uploading test data");
    uploads.run(uploader, &mut tests).await?;
    scoring::distribute_scores(&mut tests);

    Ok((testsets, tests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_padded_pattern() {
        let pattern = FileNamePattern::from_printf_format("tests/%02d.a").unwrap();
        assert_eq!(pattern.format(7), "tests/07.a");
        assert_eq!(pattern.format(123), "tests/123.a");
        assert_eq!(FileNamePattern::from_printf_format("%d").unwrap().format(5), "5");
    }

    #[test]
    fn unsafe_patterns_are_rejected() {
        for pattern in ["../tests/%02d", "/tmp/%d", "C:/%d", "tests\\%d", "tests/%02d/%d", "tests"] {
            assert!(
                matches!(
                    FileNamePattern::from_printf_format(pattern),
                    Err(ImportError::InvalidPattern { .. })
                ),
                "{pattern}"
            );
        }
        assert!(FileNamePattern::from_printf_format("%0200d").is_err());
        assert!(FileNamePattern::from_printf_format("%2d").is_err());
    }

    #[test]
    fn tags_override_limits() {
        let overrides = tag_overrides(["eolymp_tl=3000", "eolymp_ml=oops", "min_block", "dp"]);
        assert_eq!(
            overrides,
            TagOverrides {
                block_min: true,
                time_limit: Some(3000),
                memory_limit: None,
            }
        );
    }

    fn group(name: &str, points_policy: &str, feedback_policy: &str, deps: &[&str]) -> parser::Group {
        parser::Group {
            name: name.into(),
            feedback_policy: feedback_policy.into(),
            points_policy: points_policy.into(),
            dependencies: parser::Dependencies {
                list: deps
                    .iter()
                    .map(|dep| parser::Dependency { group: dep.to_string() })
                    .collect(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn declared_groups_shape_testsets() {
        let polyset = parser::TestSet {
            groups: parser::Groups {
                list: vec![
                    group("0", "each-test", "complete", &[]),
                    group("1", "complete-group", "icpc", &["0"]),
                    group("2", "each-test", "icpc-expanded", &["1", "3"]),
                ],
            },
            tests: parser::Tests {
                list: vec![parser::Test {
                    group: "3".into(),
                    ..Default::default()
                }],
            },
            ..Default::default()
        };
        let limits = Limits {
            cpu_limit_ms: 1000,
            memory_limit_bytes: 1 << 28,
            file_size_limit_bytes: FILE_SIZE_LIMIT,
        };
        let indices = GroupIndices::assign(group_names(&polyset));
        let testsets = build_testsets(&polyset, &indices, limits, false);

        let summary: Vec<_> = testsets
            .iter()
            .map(|t| (t.index, t.scoring_mode, t.feedback_policy, t.dependencies.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, ScoringMode::Each, FeedbackPolicy::Complete, vec![]),
                (1, ScoringMode::All, FeedbackPolicy::Icpc, vec![0]),
                (2, ScoringMode::Each, FeedbackPolicy::IcpcExpanded, vec![1]),
                (3, ScoringMode::All, FeedbackPolicy::IcpcExpanded, vec![]),
            ]
        );

        let blocked = build_testsets(&polyset, &indices, limits, true);
        assert_eq!(blocked[0].scoring_mode, ScoringMode::Each);
        assert!(blocked[1..]
            .iter()
            .all(|t| t.scoring_mode == ScoringMode::Worst
                && t.dependency_mode == DependencyMode::FirstPoint));
    }
}
