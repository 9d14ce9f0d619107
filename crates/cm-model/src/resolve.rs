use std::collections::HashMap;

use cm_core::{Diagnostic, SourceSpan};

use crate::definition::{Definition, ReferenceSlot};
use crate::definitions::{CriterionDefinition, PlanItemDefinition, PlanItemOnPartDefinition};
use crate::document::DefinitionDocument;
use crate::node::NodeRef;
use crate::reference::Reference;

impl DefinitionDocument {
    /// Turns every reference id into a node handle. Runs after the whole tree was parsed,
    /// so forward references resolve. Ids that match nothing stay as plain strings.
    pub(crate) fn resolve_references(&mut self) {
        self.migrate_legacy_criteria();
        self.migrate_legacy_on_parts();

        let index = self.id_index();
        let mut dangling = Vec::new();
        for node in self.elements.clone() {
            let entry = self.node_mut(node);
            let span = entry.source.as_ref().map(|source| source.location.clone());
            let tag = entry.data.tag_name().to_string();
            for field in entry.data.reference_fields() {
                let (name, warn) = (field.name, field.warn_if_dangling);
                let mut check = |reference: &mut Reference| {
                    if reference.id().is_empty() {
                        return;
                    }
                    let target = index.get(reference.id()).copied();
                    reference.resolve(target);
                    if target.is_none() && warn {
                        dangling.push(dangling_warning(&tag, name, reference.id(), &span));
                    }
                };
                match field.slot {
                    ReferenceSlot::One(reference) => check(reference),
                    ReferenceSlot::Many(list) => list.iter_mut().for_each(&mut check),
                }
            }
        }

        for warning in dangling {
            log::warn!(
                "event=reference_resolve status=dangling file={} message={}",
                self.file_name(),
                warning.message
            );
            self.record(warning);
        }
    }

    /// First node registered under each id.
    fn id_index(&self) -> HashMap<String, NodeRef> {
        let mut index = HashMap::new();
        for node in &self.elements {
            if let Some(id) = self.node(*node).id() {
                index.entry(id.to_string()).or_insert(*node);
            }
        }
        index
    }

    /// `entryCriteriaRefs` / `exitCriteriaRefs` on a plan item become criterion children.
    fn migrate_legacy_criteria(&mut self) {
        for plan_item in self.elements_of::<PlanItemDefinition>() {
            let Some(data) = self.get_mut::<PlanItemDefinition>(plan_item) else {
                continue;
            };
            let entry_refs = std::mem::take(&mut data.legacy_entry_refs);
            let exit_refs = std::mem::take(&mut data.legacy_exit_refs);

            let legacy = entry_refs
                .iter()
                .map(|sentry| (CriterionDefinition::entry(), sentry.id().to_string()))
                .chain(
                    exit_refs
                        .iter()
                        .map(|sentry| (CriterionDefinition::exit(), sentry.id().to_string())),
                );
            for (criterion, sentry) in legacy.collect::<Vec<_>>() {
                if self.add_criterion(plan_item, criterion.with_sentry(sentry)).is_some() {
                    self.migrated = true;
                }
            }
        }
    }

    /// A plan item on part that names a sentry is rewritten to name the exit criterion of
    /// its source plan item that uses that sentry.
    fn migrate_legacy_on_parts(&mut self) {
        for on_part in self.elements_of::<PlanItemOnPartDefinition>() {
            let Some(data) = self.get::<PlanItemOnPartDefinition>(on_part) else {
                continue;
            };
            let sentry = data.legacy_sentry_ref.id().to_string();
            if sentry.is_empty() {
                continue;
            }
            let source = data.source_ref.id().to_string();

            let Some(plan_item) = self
                .find_element::<PlanItemDefinition>(&source)
                .map(|(node, _)| node)
            else {
                let span = self.node(on_part).source.as_ref().map(|s| s.location.clone());
                self.record(
                    Diagnostic::warning(
                        "LEGACY_SENTRY_REF_UNMIGRATED",
                        format!(
                            "On part sentryRef \"{}\" kept: source plan item \"{}\" not found.",
                            sentry, source
                        ),
                    )
                    .at(span),
                );
                continue;
            };

            let existing = self.get::<PlanItemDefinition>(plan_item).and_then(|item| {
                item.exit_criteria().iter().copied().find(|criterion| {
                    self.get::<CriterionDefinition>(*criterion)
                        .is_some_and(|data| data.sentry_ref.id() == sentry)
                })
            });
            let criterion = match existing {
                Some(criterion) => Some(criterion),
                None => self.add_criterion(
                    plan_item,
                    CriterionDefinition::exit().with_sentry(sentry.as_str()),
                ),
            };
            let Some(criterion) = criterion else {
                continue;
            };
            let Some(criterion_id) = self.node(criterion).id().map(str::to_string) else {
                continue;
            };

            if let Some(data) = self.get_mut::<PlanItemOnPartDefinition>(on_part) {
                data.exit_criterion_ref = Reference::new(criterion_id);
                data.legacy_sentry_ref.clear();
                self.migrated = true;
            }
        }
    }

    fn add_criterion(
        &mut self,
        plan_item: NodeRef,
        criterion: CriterionDefinition,
    ) -> Option<NodeRef> {
        let (id, _) = self.next_identity(criterion.type_label());
        match self.insert_definition(Some(plan_item), Box::new(criterion), Some(id), None) {
            Ok(node) => Some(node),
            Err(error) => {
                log::warn!(
                    "event=legacy_migration status=skipped file={} code={} message={}",
                    self.file_name(),
                    error.code,
                    error.message
                );
                None
            }
        }
    }
}

fn dangling_warning(
    tag: &str,
    field: &str,
    id: &str,
    span: &Option<SourceSpan>,
) -> Diagnostic {
    Diagnostic::warning(
        "REFERENCE_DANGLING",
        format!("<{}> {}=\"{}\" does not match any element.", tag, field, id),
    )
    .at(span.clone())
}
