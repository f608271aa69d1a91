//! The variable registry: single owner of definitions, values, placeholder
//! status and the per-variable editing state.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, trace};

use crate::overlay::KnownVariables;
use crate::placeholders::{applied_ids, canonical_ids, is_canonical_id, normalize, scan};

use super::types::{
    PlaceholderStatus, Reconciliation, RegistryError, RegistrySnapshot, VariableDefinition,
};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>|&nbsp;|&#160;").expect("valid regex"));

/// How long a pulsed variable stays highlighted unless configured otherwise.
pub const DEFAULT_PULSE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
struct Pulse {
    id: String,
    until: Instant,
}

/// Owns everything the variable panel shows.
///
/// All mutation goes through the methods below; the overlay and the apply
/// engine only read from it.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    definitions: Vec<VariableDefinition>,
    values: HashMap<String, String>,
    statuses: HashMap<String, PlaceholderStatus>,
    /// Markup of the last reconciled document, after normalization.
    content: String,
    editing: Option<String>,
    pulse: Option<Pulse>,
    pulse_duration: Duration,
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE)
    }
}

impl VariableRegistry {
    pub fn new(pulse_duration: Duration) -> Self {
        Self {
            definitions: Vec::new(),
            values: HashMap::new(),
            statuses: HashMap::new(),
            content: String::new(),
            editing: None,
            pulse: None,
            pulse_duration,
        }
    }

    /// Reconcile the registry against the latest document markup.
    ///
    /// Migrates bracket placeholders, appends a definition for every canonical
    /// id not seen before and recomputes the status of every known variable.
    /// Existing definitions and values are left untouched. A document without
    /// any text is ignored entirely: it usually means the editor has not
    /// loaded yet.
    pub fn record_content_change(&mut self, markup: &str) -> Reconciliation {
        if !has_text(markup) {
            debug!("document has no text, keeping registry as is");
            return Reconciliation { skipped: true, ..Reconciliation::default() };
        }

        let scanned = scan(markup);
        let outcome = normalize(markup, &scanned.mapping);
        let migrated = outcome.replaced;
        let content = outcome.markup.into_owned();

        let labels = scanned.labels();
        let mut discovered = Vec::new();
        for id in canonical_ids(&content) {
            if self.contains(&id) {
                continue;
            }
            if !is_canonical_id(&id) {
                trace!(id = %id, "ignoring placeholder with a non-canonical id");
                continue;
            }
            let label = labels.get(id.as_str()).copied().unwrap_or(id.as_str()).to_string();
            self.definitions.push(VariableDefinition::new(id.clone(), label));
            discovered.push(id);
        }

        self.refresh_statuses(&content);

        debug!(
            migrated,
            discovered = discovered.len(),
            known = self.definitions.len(),
            "reconciled variables with document"
        );

        let normalized = (migrated > 0).then(|| content.clone());
        self.content = content;

        Reconciliation { normalized, migrated, discovered, skipped: false }
    }

    /// Add a definition explicitly. Returns false if the id was already known.
    pub fn register(&mut self, definition: VariableDefinition) -> Result<bool, RegistryError> {
        if !is_canonical_id(&definition.id) {
            return Err(RegistryError::InvalidId(definition.id));
        }
        if self.contains(&definition.id) {
            return Ok(false);
        }

        let present = presence(&self.content);
        self.statuses.insert(definition.id.clone(), status_of(&present, &definition.id));
        self.definitions.push(definition);
        Ok(true)
    }

    pub fn set_value(
        &mut self,
        id: &str,
        value: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.ensure_known(id)?;
        self.values.insert(id.to_string(), value.into());
        Ok(())
    }

    /// Wipe every value, leave editing, drop the highlight. Definitions stay:
    /// they come from the document, not from values.
    pub fn clear_all(&mut self) {
        self.values.clear();
        self.editing = None;
        self.pulse = None;
        debug!("cleared all variable values");
    }

    pub fn open_editor(&mut self, id: &str) -> Result<(), RegistryError> {
        self.ensure_known(id)?;
        self.editing = Some(id.to_string());
        Ok(())
    }

    pub fn close_editor(&mut self) {
        self.editing = None;
    }

    /// Highlight a variable until `now` plus the pulse duration.
    pub fn pulse(&mut self, id: &str, now: Instant) -> Result<(), RegistryError> {
        self.ensure_known(id)?;
        self.pulse = Some(Pulse { id: id.to_string(), until: now + self.pulse_duration });
        Ok(())
    }

    /// Drop an elapsed pulse. Returns true if one was cleared.
    pub fn expire_pulse(&mut self, now: Instant) -> bool {
        if self.pulse.as_ref().is_some_and(|p| now >= p.until) {
            self.pulse = None;
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.iter().any(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[VariableDefinition] {
        &self.definitions
    }

    pub fn definition(&self, id: &str) -> Option<&VariableDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Current value, empty when unset.
    pub fn value(&self, id: &str) -> &str {
        self.values.get(id).map_or("", String::as_str)
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// `(id, value)` for every definition, in definition order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions.iter().map(|d| (d.id.as_str(), self.value(&d.id)))
    }

    pub fn status(&self, id: &str) -> Option<PlaceholderStatus> {
        self.statuses.get(id).copied()
    }

    pub fn statuses(&self) -> &HashMap<String, PlaceholderStatus> {
        &self.statuses
    }

    /// Ids whose placeholder was not found at the last scan.
    pub fn missing(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|d| self.status(&d.id) == Some(PlaceholderStatus::Missing))
            .map(|d| d.id.as_str())
            .collect()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn pulsing(&self) -> Option<&str> {
        self.pulse.as_ref().map(|p| p.id.as_str())
    }

    pub fn known_ids(&self) -> HashSet<String> {
        self.definitions.iter().map(|d| d.id.clone()).collect()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            definitions: self.definitions.clone(),
            values: self.values.clone(),
            statuses: self.statuses.clone(),
            editing: self.editing.clone(),
            pulsing: self.pulsing().map(ToOwned::to_owned),
        }
    }

    fn ensure_known(&self, id: &str) -> Result<(), RegistryError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(RegistryError::UnknownVariable(id.to_string()))
        }
    }

    fn refresh_statuses(&mut self, markup: &str) {
        let present = presence(markup);
        self.statuses = self
            .definitions
            .iter()
            .map(|d| (d.id.clone(), status_of(&present, &d.id)))
            .collect();
    }
}

impl KnownVariables for VariableRegistry {
    fn is_known(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Ids present in the markup either as a bare token or as an applied span.
fn presence(markup: &str) -> HashSet<String> {
    let mut ids: HashSet<String> = canonical_ids(markup).into_iter().collect();
    ids.extend(applied_ids(markup));
    ids
}

fn status_of(present: &HashSet<String>, id: &str) -> PlaceholderStatus {
    if present.contains(id) { PlaceholderStatus::Found } else { PlaceholderStatus::Missing }
}

fn has_text(markup: &str) -> bool {
    !TAG_RE.replace_all(markup, "").trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_text() {
        assert!(!has_text(""));
        assert!(!has_text("<p></p>"));
        assert!(!has_text("<p>&nbsp;</p>\n<p><br></p>"));
        assert!(has_text("<p>a</p>"));
        assert!(has_text("{{x}}"));
    }

    #[test]
    fn test_discovers_in_document_order() {
        let mut reg = VariableRegistry::default();
        let rec = reg.record_content_change("<p>{{b}} {{a}} {{b}}</p>");
        assert_eq!(rec.discovered, vec!["b", "a"]);
        assert_eq!(reg.definitions()[0].label, "b");
        assert!(rec.normalized.is_none());
    }

    #[test]
    fn test_non_canonical_ids_are_not_registered() {
        let mut reg = VariableRegistry::default();
        reg.record_content_change("<p>{{Client Name}} {{ok_1}}</p>");
        assert!(!reg.contains("Client Name"));
        assert!(reg.contains("ok_1"));
    }

    #[test]
    fn test_existing_definitions_and_values_survive() {
        let mut reg = VariableRegistry::default();
        reg.record_content_change("<p>{{a}}</p>");
        reg.set_value("a", "1").unwrap();
        reg.record_content_change("<p>nothing here</p>");
        assert!(reg.contains("a"));
        assert_eq!(reg.value("a"), "1");
        assert_eq!(reg.status("a"), Some(PlaceholderStatus::Missing));
    }

    #[test]
    fn test_empty_document_skips_pass() {
        let mut reg = VariableRegistry::default();
        reg.record_content_change("<p>{{a}}</p>");
        let rec = reg.record_content_change("<p></p>");
        assert!(rec.skipped);
        assert_eq!(reg.status("a"), Some(PlaceholderStatus::Found));
    }

    #[test]
    fn test_register_uses_last_content() {
        let mut reg = VariableRegistry::default();
        reg.record_content_change("<p>{{a}}</p>");
        assert!(!reg.register(VariableDefinition::new("a", "A")).unwrap());
        assert!(reg.register(VariableDefinition::new("b", "B")).unwrap());
        assert_eq!(reg.status("b"), Some(PlaceholderStatus::Missing));
        assert_eq!(
            reg.register(VariableDefinition::new("Bad Id", "x")),
            Err(RegistryError::InvalidId("Bad Id".into()))
        );
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut reg = VariableRegistry::default();
        assert_eq!(
            reg.set_value("nope", "x"),
            Err(RegistryError::UnknownVariable("nope".into()))
        );
        assert!(reg.open_editor("nope").is_err());
    }

    #[test]
    fn test_pulse_expires_independently_of_editing() {
        let t0 = Instant::now();
        let mut reg = VariableRegistry::new(Duration::from_millis(100));
        reg.record_content_change("<p>{{a}}</p>");
        reg.open_editor("a").unwrap();
        reg.pulse("a", t0).unwrap();
        assert_eq!(reg.pulsing(), Some("a"));
        assert!(!reg.expire_pulse(t0 + Duration::from_millis(50)));
        assert!(reg.expire_pulse(t0 + Duration::from_millis(100)));
        assert_eq!(reg.pulsing(), None);
        assert_eq!(reg.editing(), Some("a"));
    }

    #[test]
    fn test_clear_all_keeps_definitions() {
        let t0 = Instant::now();
        let mut reg = VariableRegistry::default();
        reg.record_content_change("<p>{{a}} {{b}}</p>");
        reg.set_value("a", "x").unwrap();
        reg.open_editor("b").unwrap();
        reg.pulse("b", t0).unwrap();

        reg.clear_all();

        assert!(reg.values().is_empty());
        assert_eq!(reg.editing(), None);
        assert_eq!(reg.pulsing(), None);
        assert_eq!(reg.definitions().len(), 2);
    }
}
