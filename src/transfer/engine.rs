//! The transfer engine.
//!
//! A run is planned sequentially and executed in parallel:
//!
//! 1. Every walked source path is classified. File strategies become work
//!    units; everything else becomes an informational finding.
//! 2. Every selected declarative rule (structure-only, scaffold) becomes one
//!    work unit per marker or scaffold file.
//! 3. Units claiming the same target path are resolved: the first in sorted
//!    order wins, the others fail.
//! 4. Units run on the rayon pool and fan in to a list of manifest entries.
//!
//! Per-path failures never abort the run. They become failed manifest
//! entries plus fatal findings.

use std::fs;

use rayon::prelude::*;

use crate::classify::{PathClassifier, Strategy, TransferRule};
use crate::error::PathError;
use crate::report::usage::USAGE_FILE;
use crate::scaffold::ScaffoldLibrary;
use crate::template::TemplateRenderer;
use crate::validate::finding::ValidationFinding;

use super::deadline::Deadline;
use super::manifest::{GenerationManifest, ManifestEntry, MANIFEST_FILE};
use super::walker::{EntryKind, SourceEntry, WalkOutcome};
use super::writer::OutputWriter;

/// Finding: a source path no rule matched.
pub const UNCLASSIFIED_PATH: &str = "unclassified-path";
/// Finding: a path whose rule was not selected with `--include`.
pub const EXCLUDED_BY_INCLUDE: &str = "excluded-by-include";
/// Finding: source content discarded under a structure-only rule.
pub const STRUCTURE_ONLY_DISCARD: &str = "structure-only-discard";
/// Finding: source content replaced by a scaffold.
pub const SCAFFOLD_REPLACED: &str = "scaffold-replaced";
/// Finding: a path could not be produced.
pub const PATH_FAILED: &str = "path-failed";
/// Finding: two units produce the same target path.
pub const TARGET_CONFLICT: &str = "target-conflict";
/// Finding: the time budget ran out.
pub const INCOMPLETE_RUN: &str = "incomplete-run";

/// Output of [`TransferEngine::run`].
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Manifest with sorted entries.
    pub manifest: GenerationManifest,
    /// Findings produced while transferring, sorted by path.
    pub findings: Vec<ValidationFinding>,
    /// Whether the time budget ran out.
    pub incomplete: bool,
}

#[derive(Debug)]
enum Work<'r> {
    Copy(SourceEntry),
    Genericize(SourceEntry),
    Marker,
    ScaffoldFile(&'r str),
}

#[derive(Debug)]
struct WorkUnit<'r> {
    source_path: String,
    target_path: String,
    strategy: Strategy,
    work: Work<'r>,
}

enum UnitOutcome {
    Done(ManifestEntry, Option<ValidationFinding>),
    TimedOut,
}

/// Applies transfer strategies to a walked source tree.
pub struct TransferEngine<'a> {
    classifier: &'a PathClassifier,
    renderer: TemplateRenderer<'a>,
    scaffolds: &'a ScaffoldLibrary,
    marker_file: String,
}

impl<'a> TransferEngine<'a> {
    /// Create an engine.
    pub fn new(
        classifier: &'a PathClassifier,
        renderer: TemplateRenderer<'a>,
        scaffolds: &'a ScaffoldLibrary,
    ) -> Self {
        Self {
            classifier,
            renderer,
            scaffolds,
            marker_file: ".gitkeep".to_string(),
        }
    }

    /// Set the structure-only marker file name.
    pub fn with_marker_file(mut self, marker_file: impl Into<String>) -> Self {
        self.marker_file = marker_file.into();
        self
    }

    /// Run the transfer.
    ///
    /// `manifest` carries the run metadata; its entries are replaced.
    pub fn run(
        &self,
        walk: WalkOutcome,
        writer: &dyn OutputWriter,
        deadline: &Deadline,
        mut manifest: GenerationManifest,
    ) -> TransferOutcome {
        let mut findings = Vec::new();
        let mut entries = Vec::new();

        for failure in walk.failures {
            let rule = self.classifier.classify(&failure.rel_path);
            let target = match rule.strategy {
                Strategy::FullCopy | Strategy::Genericize => self
                    .file_target(rule, &failure.rel_path)
                    .unwrap_or_else(|_| failure.rel_path.clone()),
                _ => failure.rel_path.clone(),
            };
            let (entry, finding) =
                failed(&failure.rel_path, &target, rule.strategy, failure.error);
            entries.push(entry);
            findings.push(finding);
        }

        let mut units = Vec::new();
        for entry in walk.entries {
            self.plan_entry(entry, &mut units, &mut entries, &mut findings);
        }
        self.plan_declarative(&mut units, &mut entries, &mut findings);

        let units = resolve_conflicts(units, &mut entries, &mut findings);
        tracing::info!("Transferring {} units", units.len());

        let results: Vec<UnitOutcome> = units
            .par_iter()
            .map(|unit| self.process(unit, writer, deadline))
            .collect();

        let mut timed_out = 0;
        for result in results {
            match result {
                UnitOutcome::Done(entry, finding) => {
                    entries.push(entry);
                    findings.extend(finding);
                }
                UnitOutcome::TimedOut => timed_out += 1,
            }
        }

        let incomplete = walk.incomplete || timed_out > 0;
        if incomplete {
            findings.push(ValidationFinding::fatal(
                INCOMPLETE_RUN,
                format!(
                    "time budget of {}s exhausted; {} unit(s) not processed{}",
                    deadline.budget().as_secs(),
                    timed_out,
                    if walk.incomplete {
                        ", source walk did not finish"
                    } else {
                        ""
                    }
                ),
            ));
        }

        findings.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
                .then_with(|| a.message.cmp(&b.message))
        });
        manifest.set_entries(entries);

        TransferOutcome {
            manifest,
            findings,
            incomplete,
        }
    }

    fn plan_entry<'r>(
        &'r self,
        entry: SourceEntry,
        units: &mut Vec<WorkUnit<'r>>,
        entries: &mut Vec<ManifestEntry>,
        findings: &mut Vec<ValidationFinding>,
    ) {
        let rule = self.classifier.classify(&entry.rel_path);

        if rule.is_unclassified() {
            findings.push(
                ValidationFinding::info(UNCLASSIFIED_PATH, "no rule matches; path skipped")
                    .with_path(&entry.rel_path),
            );
            return;
        }
        if !self.classifier.is_selected(rule) {
            findings.push(
                ValidationFinding::info(
                    EXCLUDED_BY_INCLUDE,
                    format!("rule '{}' not selected with --include", rule.name),
                )
                .with_path(&entry.rel_path),
            );
            return;
        }

        let work: fn(SourceEntry) -> Work<'r> = match rule.strategy {
            Strategy::FullCopy => Work::Copy,
            Strategy::Genericize => Work::Genericize,
            Strategy::StructureOnly => {
                findings.push(
                    ValidationFinding::info(
                        STRUCTURE_ONLY_DISCARD,
                        format!("content discarded: '{}' is structure-only", rule.pattern),
                    )
                    .with_path(&entry.rel_path),
                );
                return;
            }
            Strategy::Scaffold => {
                findings.push(
                    ValidationFinding::info(
                        SCAFFOLD_REPLACED,
                        format!(
                            "replaced by scaffold '{}'",
                            rule.scaffold.as_deref().unwrap_or_default()
                        ),
                    )
                    .with_path(&entry.rel_path),
                );
                return;
            }
            Strategy::Skip => return,
        };

        match self.file_target(rule, &entry.rel_path) {
            Ok(target_path) => units.push(WorkUnit {
                source_path: entry.rel_path.clone(),
                target_path,
                strategy: rule.strategy,
                work: work(entry),
            }),
            Err(err) => {
                let (failed_entry, finding) =
                    failed(&entry.rel_path, &entry.rel_path, rule.strategy, err);
                entries.push(failed_entry);
                findings.push(finding);
            }
        }
    }

    fn plan_declarative<'r>(
        &'r self,
        units: &mut Vec<WorkUnit<'r>>,
        entries: &mut Vec<ManifestEntry>,
        findings: &mut Vec<ValidationFinding>,
    ) {
        for rule in self.classifier.selected_rules() {
            if !rule.strategy.is_declarative() {
                continue;
            }
            let source = rule.pattern.to_string();

            let dir = match self.declared_dir(rule) {
                Ok(dir) => dir,
                Err(err) => {
                    let (entry, finding) = failed(&source, &source, rule.strategy, err);
                    entries.push(entry);
                    findings.push(finding);
                    continue;
                }
            };

            match rule.strategy {
                Strategy::StructureOnly => {
                    let mut dirs = vec![(source.clone(), dir.clone())];
                    for sub in &rule.subdirs {
                        let sub = sub.trim_matches('/');
                        dirs.push((format!("{}{}/", source, sub), format!("{}/{}", dir, sub)));
                    }
                    for (source_path, target_dir) in dirs {
                        units.push(WorkUnit {
                            source_path,
                            target_path: format!("{}/{}", target_dir, self.marker_file),
                            strategy: Strategy::StructureOnly,
                            work: Work::Marker,
                        });
                    }
                }
                Strategy::Scaffold => {
                    let name = rule.scaffold.as_deref().unwrap_or_default();
                    let Some(scaffold) = self.scaffolds.get(name) else {
                        let err = PathError::io(
                            source.clone(),
                            std::io::Error::new(
                                std::io::ErrorKind::NotFound,
                                format!("unknown scaffold '{}'", name),
                            ),
                        );
                        let (entry, finding) = failed(&source, &dir, rule.strategy, err);
                        entries.push(entry);
                        findings.push(finding);
                        continue;
                    };
                    for (file, content) in &scaffold.files {
                        units.push(WorkUnit {
                            source_path: format!("scaffold:{}/{}", scaffold.name, file),
                            target_path: format!("{}/{}", dir, file),
                            strategy: Strategy::Scaffold,
                            work: Work::ScaffoldFile(content),
                        });
                    }
                }
                Strategy::FullCopy | Strategy::Genericize | Strategy::Skip => {}
            }
        }
    }

    /// Target path for a file matched by `rule`.
    fn file_target(&self, rule: &TransferRule, rel: &str) -> Result<String, PathError> {
        let Some(template) = &rule.target else {
            return Ok(rel.to_string());
        };

        let suffix = rule.pattern.suffix(rel);
        let file_name = rel.rsplit('/').next().unwrap_or(rel);
        let rendered = self.render_target(template, rel, suffix, file_name)?;
        let target = if rendered.ends_with('/') {
            format!("{}{}", rendered, suffix)
        } else {
            rendered
        };
        normalize_target(rel, &target)
    }

    /// Target directory for a declarative rule.
    fn declared_dir(&self, rule: &TransferRule) -> Result<String, PathError> {
        let source = rule.pattern.to_string();
        let Some(dir) = rule.pattern.directory() else {
            return Err(PathError::InvalidTargetPath {
                path: source.clone(),
                target: source,
            });
        };

        match &rule.target {
            None => normalize_target(&source, dir),
            Some(template) => {
                let name = dir.rsplit('/').next().unwrap_or(dir);
                let rendered = self.render_target(template, dir, "", name)?;
                normalize_target(&source, rendered.trim_end_matches('/'))
            }
        }
    }

    fn render_target(
        &self,
        template: &str,
        rel: &str,
        suffix: &str,
        file_name: &str,
    ) -> Result<String, PathError> {
        let rendered = self.renderer.render_with(
            template,
            [
                ("REL_PATH", rel.to_string()),
                ("REL_SUFFIX", suffix.to_string()),
                ("FILE_NAME", file_name.to_string()),
            ],
        );
        if !rendered.is_complete() {
            return Err(PathError::UnresolvedPlaceholders {
                path: rel.to_string(),
                names: rendered.unresolved.into_iter().collect(),
            });
        }
        Ok(rendered.content)
    }

    fn process(
        &self,
        unit: &WorkUnit<'_>,
        writer: &dyn OutputWriter,
        deadline: &Deadline,
    ) -> UnitOutcome {
        if deadline.expired() {
            return UnitOutcome::TimedOut;
        }

        match self.execute(unit, writer) {
            Ok(entry) => UnitOutcome::Done(entry, None),
            Err(err) => {
                tracing::warn!("{}", err);
                let (entry, finding) =
                    failed(&unit.source_path, &unit.target_path, unit.strategy, err);
                UnitOutcome::Done(entry, Some(finding))
            }
        }
    }

    fn execute(
        &self,
        unit: &WorkUnit<'_>,
        writer: &dyn OutputWriter,
    ) -> Result<ManifestEntry, PathError> {
        let target = unit.target_path.as_str();

        match &unit.work {
            Work::Copy(entry) => match &entry.kind {
                EntryKind::File => {
                    let content =
                        fs::read(&entry.abs_path).map_err(|e| PathError::io(&entry.rel_path, e))?;
                    let perms = fs::metadata(&entry.abs_path)
                        .map_err(|e| PathError::io(&entry.rel_path, e))?
                        .permissions();
                    writer.write_file(target, &content, Some(&perms))?;
                    Ok(ManifestEntry::written(
                        &unit.source_path,
                        target,
                        unit.strategy,
                        &content,
                        is_executable(&perms),
                    ))
                }
                EntryKind::Symlink { link, .. } => {
                    writer.write_symlink(target, link)?;
                    let text = link.to_string_lossy();
                    Ok(ManifestEntry::written(
                        &unit.source_path,
                        target,
                        unit.strategy,
                        text.as_bytes(),
                        false,
                    ))
                }
            },

            Work::Genericize(entry) => {
                if matches!(entry.kind, EntryKind::Symlink { is_dir: true, .. }) {
                    return Err(PathError::DirectorySymlink {
                        path: entry.rel_path.clone(),
                    });
                }

                let bytes =
                    fs::read(&entry.abs_path).map_err(|e| PathError::io(&entry.rel_path, e))?;
                let perms = fs::metadata(&entry.abs_path)
                    .map_err(|e| PathError::io(&entry.rel_path, e))?
                    .permissions();
                let text = String::from_utf8(bytes).map_err(|_| PathError::NonUtf8 {
                    path: entry.rel_path.clone(),
                })?;

                let rendered = self.renderer.genericize(&text);
                if !rendered.is_complete() {
                    return Err(PathError::UnresolvedPlaceholders {
                        path: entry.rel_path.clone(),
                        names: rendered.unresolved.into_iter().collect(),
                    });
                }

                writer.write_file(target, rendered.content.as_bytes(), Some(&perms))?;
                Ok(ManifestEntry::written(
                    &unit.source_path,
                    target,
                    unit.strategy,
                    rendered.content.as_bytes(),
                    is_executable(&perms),
                ))
            }

            Work::Marker => {
                writer.write_file(target, &[], None)?;
                Ok(ManifestEntry::written(
                    &unit.source_path,
                    target,
                    unit.strategy,
                    &[],
                    false,
                ))
            }

            Work::ScaffoldFile(content) => {
                // Scaffold output may keep placeholders for the user; the
                // validator reports them.
                let rendered = self.renderer.render(content);
                writer.write_file(target, rendered.content.as_bytes(), None)?;
                Ok(ManifestEntry::written(
                    &unit.source_path,
                    target,
                    unit.strategy,
                    rendered.content.as_bytes(),
                    false,
                ))
            }
        }
    }
}

/// Build a failed manifest entry and its fatal finding.
fn failed(
    source: &str,
    target: &str,
    strategy: Strategy,
    err: PathError,
) -> (ManifestEntry, ValidationFinding) {
    let rule_id = match err {
        PathError::TargetConflict { .. } => TARGET_CONFLICT,
        _ => PATH_FAILED,
    };
    let message = err.to_string();
    let entry = ManifestEntry::failed(source, target, strategy, message.clone());
    let finding = ValidationFinding::fatal(rule_id, message).with_path(source);
    (entry, finding)
}

/// Keep the first unit per target path; fail the rest.
fn resolve_conflicts<'r>(
    mut units: Vec<WorkUnit<'r>>,
    entries: &mut Vec<ManifestEntry>,
    findings: &mut Vec<ValidationFinding>,
) -> Vec<WorkUnit<'r>> {
    units.sort_by(|a, b| {
        a.target_path
            .cmp(&b.target_path)
            .then_with(|| a.source_path.cmp(&b.source_path))
    });

    let mut kept: Vec<WorkUnit<'r>> = Vec::with_capacity(units.len());
    for unit in units {
        if let Some(owner) = kept.last().filter(|k| k.target_path == unit.target_path) {
            let err = PathError::TargetConflict {
                path: unit.source_path.clone(),
                target: unit.target_path.clone(),
                owner: owner.source_path.clone(),
            };
            let (entry, finding) = failed(&unit.source_path, &unit.target_path, unit.strategy, err);
            entries.push(entry);
            findings.push(finding);
        } else {
            kept.push(unit);
        }
    }
    kept
}

/// Validate a rendered target path.
fn normalize_target(source: &str, target: &str) -> Result<String, PathError> {
    let trimmed = target.trim_start_matches("./");
    let invalid = || PathError::InvalidTargetPath {
        path: source.to_string(),
        target: target.to_string(),
    };

    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.contains('\\') {
        return Err(invalid());
    }
    if trimmed
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(invalid());
    }
    if trimmed == MANIFEST_FILE || trimmed == USAGE_FILE {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn is_executable(perms: &fs::Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    perms.mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_perms: &fs::Permissions) -> bool {
    false
}
