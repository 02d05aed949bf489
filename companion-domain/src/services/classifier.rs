use crate::entities::{ActivityRecord, GameEvent, LootItem, Ruleset};
use crate::utils::millis_to_epoch_seconds;
use crate::value_objects::ActivityType;

/// Maps raw game events onto reportable activity records.
#[derive(Debug, Clone)]
pub struct Classifier {
    ruleset: Ruleset,
    // Lower-cased copies of the substring tables, built once.
    raid_needles: Vec<String>,
    family_needles: Vec<String>,
    rare_needles: Vec<String>,
    pet_needles: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Ruleset::default())
    }
}

impl Classifier {
    pub fn new(ruleset: Ruleset) -> Self {
        let ruleset = ruleset.normalized();
        Self {
            raid_needles: lowercase_all(&ruleset.raid_bosses),
            family_needles: lowercase_all(&ruleset.boss_families),
            rare_needles: lowercase_all(&ruleset.rare_items),
            pet_needles: lowercase_all(&ruleset.pet_keywords),
            ruleset,
        }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Returns the kill-type record followed by one `Drop` per valuable item.
    /// Blank subjects yield nothing.
    pub fn classify(&self, event: &GameEvent, team_id: &str) -> Vec<ActivityRecord> {
        let subject = event.subject_name.trim();
        if subject.is_empty() {
            return Vec::new();
        }
        let occurred_at = millis_to_epoch_seconds(event.occurred_at_millis);

        let mut records = Vec::with_capacity(1 + event.loot_items.len());
        records.push(ActivityRecord::new(
            self.classify_subject(subject),
            subject,
            None,
            occurred_at,
            team_id,
        ));
        for item in event.loot_items.iter().filter(|item| self.is_valuable(item)) {
            records.push(ActivityRecord::new(
                ActivityType::Drop,
                subject,
                Some(item.name.trim().to_string()),
                occurred_at,
                team_id,
            ));
        }
        records
    }

    pub fn classify_subject(&self, subject_name: &str) -> ActivityType {
        let subject = subject_name.trim();
        let lowered = subject.to_lowercase();
        if contains_any(&lowered, &self.raid_needles) {
            return ActivityType::RaidCompletion;
        }
        let exact_boss = self
            .ruleset
            .bosses
            .iter()
            .any(|boss| boss.eq_ignore_ascii_case(subject));
        if exact_boss || contains_any(&lowered, &self.family_needles) {
            return ActivityType::BossKill;
        }
        ActivityType::Kill
    }

    pub fn is_valuable(&self, item: &LootItem) -> bool {
        if item.name.trim().is_empty() || item.quantity <= 0 {
            return false;
        }
        if item.total_value() > self.ruleset.value_threshold {
            return true;
        }
        let lowered = item.name.to_lowercase();
        contains_any(&lowered, &self.rare_needles) || contains_any(&lowered, &self.pet_needles)
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}
