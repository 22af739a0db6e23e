//! Groups raw mentions into canonical entities with stable per-document
//! IDs.
//!
//! IDs advance per kind in order of first encounter; typed parse failures
//! keep the entity with its original surface and a `parse_error` metadata
//! block, never dropping a mention.

use std::collections::HashMap;

use tracing::debug;

use skimmer_config::NormalizeConfig;
use skimmer_core::entity::{
    CanonicalEntity, EntityMetadata, ParseErrorMetadata,
};
use skimmer_core::kind::{format_entity_id, EntityKind, GOV_PREFIX};
use skimmer_core::mention::Mention;
use skimmer_scanners::patterns::GovernmentRecord;

use crate::contact::{normalize_email, normalize_url};
use crate::datetime::{parse_date, parse_time};
use crate::fingerprint::Fingerprint;
use crate::measurement::parse_measurement;
use crate::money::parse_money;
use crate::org::{org_stem, GovernmentIndex};
use crate::person::{clean_name, find_group, PersonGroup};
use crate::phone::parse_phone;
use crate::place::{canonical_place_form, place_metadata};
use crate::regulation::parse_regulation;

/// Per-document ID allocator: one monotonic counter per prefix.
#[derive(Default)]
struct IdAllocator {
    counters: HashMap<String, u32>,
}

impl IdAllocator {
    fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format_entity_id(prefix, *counter)
    }
}

/// Canonicalization engine, shared read-only across workers.
pub struct Canonicalizer {
    config: NormalizeConfig,
    governments: GovernmentIndex,
}

impl Canonicalizer {
    pub fn new(config: NormalizeConfig, governments: Vec<GovernmentRecord>) -> Self {
        Self {
            config,
            governments: GovernmentIndex::new(governments),
        }
    }

    pub fn without_references(config: NormalizeConfig) -> Self {
        Self {
            config,
            governments: GovernmentIndex::empty(),
        }
    }

    /// Canonicalizes one document's mention list. Mentions must already be
    /// conflict-free (no overlaps); order is document order.
    pub fn canonicalize(&self, mentions: &[Mention]) -> Vec<CanonicalEntity> {
        let mut ids = IdAllocator::default();
        let mut entities = Vec::new();

        for kind in EntityKind::ALL {
            let of_kind: Vec<&Mention> = mentions.iter().filter(|m| m.kind == kind).collect();
            if of_kind.is_empty() {
                continue;
            }
            match kind {
                EntityKind::Person => self.persons(&of_kind, &mut ids, &mut entities),
                EntityKind::Org => self.orgs(&of_kind, &mut ids, &mut entities),
                EntityKind::Loc | EntityKind::Gpe => {
                    self.places(kind, &of_kind, &mut ids, &mut entities)
                }
                EntityKind::RangeIndicator => {}
                _ => self.typed(kind, &of_kind, &mut ids, &mut entities),
            }
        }

        debug!(
            mentions = mentions.len(),
            entities = entities.len(),
            "canonicalization complete"
        );
        entities
    }

    fn persons(
        &self,
        mentions: &[&Mention],
        ids: &mut IdAllocator,
        entities: &mut Vec<CanonicalEntity>,
    ) {
        let mut groups: Vec<PersonGroup> = Vec::new();
        let mut built: Vec<CanonicalEntity> = Vec::new();

        for mention in mentions {
            let cleaned = clean_name(&mention.text);
            if cleaned.is_empty() {
                continue;
            }
            let fingerprint = Fingerprint::of(&cleaned, self.config.ngram_size);
            match find_group(&cleaned, &fingerprint, &groups, &self.config) {
                Some(i) => {
                    let entity = &mut built[i];
                    if !entity.aliases.iter().any(|a| *a == mention.text) {
                        entity.aliases.push(mention.text.clone());
                    }
                    entity.mentions.push((*mention).clone());
                    entity.count += 1;
                    // Prefer the longest cleaned variant as canonical.
                    if cleaned.len() > groups[i].cleaned.len() {
                        groups[i].cleaned = cleaned.clone();
                    }
                }
                None => {
                    groups.push(PersonGroup {
                        cleaned: cleaned.clone(),
                        fingerprint,
                    });
                    built.push(CanonicalEntity {
                        id: ids.next(EntityKind::Person.prefix()),
                        kind: EntityKind::Person,
                        normalized: cleaned,
                        aliases: vec![mention.text.clone()],
                        count: 1,
                        mentions: vec![(*mention).clone()],
                        metadata: None,
                    });
                }
            }
        }

        for (group, mut entity) in groups.into_iter().zip(built) {
            entity.normalized = group.cleaned;
            entity.aliases.retain(|a| *a != entity.normalized);
            entities.push(entity);
        }
    }

    fn orgs(
        &self,
        mentions: &[&Mention],
        ids: &mut IdAllocator,
        entities: &mut Vec<CanonicalEntity>,
    ) {
        let mut by_stem: HashMap<String, usize> = HashMap::new();
        let mut built: Vec<CanonicalEntity> = Vec::new();

        for mention in mentions {
            let stem = org_stem(&mention.text);
            if stem.is_empty() {
                continue;
            }
            if let Some(&i) = by_stem.get(&stem) {
                let entity = &mut built[i];
                entity.add_alias(&mention.text);
                entity.mentions.push((*mention).clone());
                entity.count += 1;
                continue;
            }

            let mut extra_keys: Vec<String> = Vec::new();
            let entity = match self.governments.lookup(&mention.text) {
                Some(record) => {
                    // Formal name and abbreviation stems join the same group.
                    extra_keys.push(org_stem(&record.formal_name));
                    extra_keys.push(org_stem(&record.abbreviation));
                    let metadata = self.governments.metadata_for(record);
                    let mut aliases = Vec::new();
                    if !record.abbreviation.is_empty()
                        && !record.abbreviation.eq_ignore_ascii_case(&record.formal_name)
                    {
                        aliases.push(record.abbreviation.clone());
                    }
                    if !mention.text.eq_ignore_ascii_case(&record.formal_name)
                        && !aliases.iter().any(|a| a.eq_ignore_ascii_case(&mention.text))
                    {
                        aliases.push(mention.text.clone());
                    }
                    CanonicalEntity {
                        id: ids.next(GOV_PREFIX),
                        kind: EntityKind::Org,
                        normalized: record.formal_name.clone(),
                        aliases,
                        count: 1,
                        mentions: vec![(*mention).clone()],
                        metadata: Some(EntityMetadata::Government(metadata)),
                    }
                }
                None => CanonicalEntity {
                    id: ids.next(EntityKind::Org.prefix()),
                    kind: EntityKind::Org,
                    normalized: mention.text.clone(),
                    aliases: Vec::new(),
                    count: 1,
                    mentions: vec![(*mention).clone()],
                    metadata: None,
                },
            };
            let index = built.len();
            by_stem.insert(stem, index);
            for key in extra_keys {
                if !key.is_empty() {
                    by_stem.entry(key).or_insert(index);
                }
            }
            built.push(entity);
        }

        entities.extend(built);
    }

    fn places(
        &self,
        kind: EntityKind,
        mentions: &[&Mention],
        ids: &mut IdAllocator,
        entities: &mut Vec<CanonicalEntity>,
    ) {
        let mut by_form: HashMap<String, usize> = HashMap::new();
        let mut built: Vec<CanonicalEntity> = Vec::new();

        for mention in mentions {
            let subcategory = mention.subtype.as_deref();
            let form = canonical_place_form(&mention.text, subcategory);
            let key = form.to_lowercase();
            match by_form.get(&key) {
                Some(&i) => {
                    let entity = &mut built[i];
                    entity.add_alias(&mention.text);
                    entity.mentions.push((*mention).clone());
                    entity.count += 1;
                    // Longest alias wins as canonical among unstandardized
                    // variants; the displaced form stays as an alias.
                    if form.len() > entity.normalized.len() {
                        let displaced = std::mem::replace(&mut entity.normalized, form.clone());
                        if !entity.aliases.contains(&displaced) {
                            entity.aliases.push(displaced);
                        }
                        let normalized = entity.normalized.clone();
                        entity.aliases.retain(|a| *a != normalized);
                    }
                }
                None => {
                    let mut aliases = Vec::new();
                    if mention.text != form {
                        aliases.push(mention.text.clone());
                    }
                    by_form.insert(key, built.len());
                    built.push(CanonicalEntity {
                        id: ids.next(kind.prefix()),
                        kind,
                        normalized: form,
                        aliases,
                        count: 1,
                        mentions: vec![(*mention).clone()],
                        metadata: Some(EntityMetadata::Place(place_metadata(
                            subcategory,
                            kind == EntityKind::Gpe,
                        ))),
                    });
                }
            }
        }

        entities.extend(built);
    }

    /// Typed kinds (DATE, TIME, MONEY, MEASUREMENT, PHONE, EMAIL, URL,
    /// REGULATION): parse to canonical, group by canonical string.
    fn typed(
        &self,
        kind: EntityKind,
        mentions: &[&Mention],
        ids: &mut IdAllocator,
        entities: &mut Vec<CanonicalEntity>,
    ) {
        let mut by_canonical: HashMap<String, usize> = HashMap::new();
        let mut built: Vec<CanonicalEntity> = Vec::new();

        for mention in mentions {
            let (canonical, metadata) = parse_typed(kind, &mention.text);
            match by_canonical.get(&canonical) {
                Some(&i) => {
                    let entity = &mut built[i];
                    entity.add_alias(&mention.text);
                    entity.mentions.push((*mention).clone());
                    entity.count += 1;
                }
                None => {
                    let mut aliases = Vec::new();
                    if mention.text != canonical {
                        aliases.push(mention.text.clone());
                    }
                    by_canonical.insert(canonical.clone(), built.len());
                    built.push(CanonicalEntity {
                        id: ids.next(kind.prefix()),
                        kind,
                        normalized: canonical,
                        aliases,
                        count: 1,
                        mentions: vec![(*mention).clone()],
                        metadata,
                    });
                }
            }
        }

        entities.extend(built);
    }
}

fn parse_typed(kind: EntityKind, text: &str) -> (String, Option<EntityMetadata>) {
    let fallback = |text: &str| {
        (
            text.to_string(),
            Some(EntityMetadata::ParseError(ParseErrorMetadata::new(text))),
        )
    };

    match kind {
        EntityKind::Date => match parse_date(text) {
            Some(parsed) => (parsed.canonical, Some(EntityMetadata::Date(parsed.metadata))),
            None => fallback(text),
        },
        EntityKind::Time => match parse_time(text) {
            Some(parsed) => (parsed.canonical, Some(EntityMetadata::Time(parsed.metadata))),
            None => fallback(text),
        },
        EntityKind::Money => match parse_money(text) {
            Some(parsed) => (parsed.canonical, Some(EntityMetadata::Money(parsed.metadata))),
            None => fallback(text),
        },
        EntityKind::Measurement => match parse_measurement(text) {
            Some(parsed) => (
                parsed.canonical,
                Some(EntityMetadata::Measurement(parsed.metadata)),
            ),
            None => fallback(text),
        },
        EntityKind::Phone => match parse_phone(text) {
            Some(parsed) => (parsed.canonical, Some(EntityMetadata::Phone(parsed.metadata))),
            None => fallback(text),
        },
        EntityKind::Regulation => match parse_regulation(text) {
            Some(parsed) => (
                parsed.canonical,
                Some(EntityMetadata::Regulation(parsed.metadata)),
            ),
            None => fallback(text),
        },
        EntityKind::Email => (normalize_email(text), None),
        EntityKind::Url => (normalize_url(text), None),
        _ => (text.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::mention::Span;

    fn mention(text: &str, kind: EntityKind, start: usize) -> Mention {
        Mention::new(text, kind, Span::new(start, start + text.len()), 0.9)
    }

    fn canonicalizer() -> Canonicalizer {
        Canonicalizer::without_references(NormalizeConfig::default())
    }

    fn with_osha() -> Canonicalizer {
        Canonicalizer::new(
            NormalizeConfig::default(),
            vec![GovernmentRecord {
                formal_name: "Occupational Safety and Health Administration".into(),
                abbreviation: "OSHA".into(),
                website: "https://www.osha.gov".into(),
                mission: "Assure safe and healthful working conditions".into(),
            }],
        )
    }

    #[test]
    fn person_title_stripping_groups_variants() {
        let mentions = vec![
            mention("Dr. Jane Smith", EntityKind::Person, 0),
            mention("Jane Smith", EntityKind::Person, 20),
            mention("Smith, Jane", EntityKind::Person, 42),
        ];
        let entities = canonicalizer().canonicalize(&mentions);
        assert_eq!(entities.len(), 1);
        let person = &entities[0];
        assert_eq!(person.id, "p00001");
        assert_eq!(person.normalized, "Jane Smith");
        assert_eq!(person.count, 3);
        assert!(person.aliases.contains(&"Dr. Jane Smith".to_string()));
        assert!(person.aliases.contains(&"Smith, Jane".to_string()));
    }

    #[test]
    fn government_org_linking() {
        let mentions = vec![mention("OSHA", EntityKind::Org, 0)];
        let entities = with_osha().canonicalize(&mentions);
        assert_eq!(entities.len(), 1);
        let org = &entities[0];
        assert_eq!(org.id, "gov00001");
        assert_eq!(
            org.normalized,
            "Occupational Safety and Health Administration"
        );
        assert_eq!(org.aliases, vec!["OSHA".to_string()]);
        assert!(matches!(
            org.metadata,
            Some(EntityMetadata::Government(_))
        ));
    }

    #[test]
    fn org_stem_grouping() {
        let mentions = vec![
            mention("Acme Corp", EntityKind::Org, 0),
            mention("Acme Inc", EntityKind::Org, 30),
        ];
        let entities = canonicalizer().canonicalize(&mentions);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].count, 2);
        assert_eq!(entities[0].id, "org00001");
    }

    #[test]
    fn state_abbreviation_maps_to_full_name() {
        let mut m = mention("CA", EntityKind::Gpe, 0);
        m.subtype = Some("us_states".into());
        let entities = canonicalizer().canonicalize(&[m]);
        assert_eq!(entities[0].normalized, "California");
        assert_eq!(entities[0].aliases, vec!["CA".to_string()]);
        assert_eq!(entities[0].id, "gpe00001");
    }

    #[test]
    fn money_with_magnitude() {
        let mentions = vec![mention("$2.5 million", EntityKind::Money, 0)];
        let entities = canonicalizer().canonicalize(&mentions);
        let money = &entities[0];
        assert_eq!(money.id, "mon00001");
        assert_eq!(money.normalized, "2500000");
        match &money.metadata {
            Some(EntityMetadata::Money(meta)) => {
                assert_eq!(meta.currency, "USD");
                assert_eq!(meta.original_value, 2.5);
                assert_eq!(meta.multiplier, 1_000_000.0);
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[test]
    fn date_range_canonical() {
        let mentions = vec![mention("August 15-20, 2024", EntityKind::Date, 0)];
        let entities = canonicalizer().canonicalize(&mentions);
        assert_eq!(entities[0].normalized, "2024-08-15 to 2024-08-20");
        match &entities[0].metadata {
            Some(EntityMetadata::Date(meta)) => {
                assert_eq!(meta.duration_days, Some(6));
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_kept_with_parse_error() {
        let mentions = vec![mention("sometime soon", EntityKind::Date, 0)];
        let entities = canonicalizer().canonicalize(&mentions);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].normalized, "sometime soon");
        assert!(matches!(
            entities[0].metadata,
            Some(EntityMetadata::ParseError(_))
        ));
    }

    #[test]
    fn ids_unique_and_ordered_within_document() {
        let mentions = vec![
            mention("6 feet", EntityKind::Measurement, 0),
            mention("10 meters", EntityKind::Measurement, 20),
            mention("$5", EntityKind::Money, 40),
        ];
        let entities = canonicalizer().canonicalize(&mentions);
        let meas: Vec<_> = entities
            .iter()
            .filter(|e| e.kind == EntityKind::Measurement)
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(meas, vec!["meas00001", "meas00002"]);
        assert!(entities.iter().any(|e| e.id == "mon00001"));
    }

    #[test]
    fn duplicate_surfaces_group_by_canonical() {
        let mentions = vec![
            mention("6 feet", EntityKind::Measurement, 0),
            mention("6 ft", EntityKind::Measurement, 30),
        ];
        let entities = canonicalizer().canonicalize(&mentions);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].count, 2);
        assert!(entities[0].knows_surface("6 feet"));
        assert!(entities[0].knows_surface("6 ft"));
    }

    #[test]
    fn confidence_never_lowered_by_grouping() {
        let mut a = mention("Jane Smith", EntityKind::Person, 0);
        a.confidence = 0.95;
        let mut b = mention("Jane Smith", EntityKind::Person, 30);
        b.confidence = 0.6;
        let entities = canonicalizer().canonicalize(&[a, b]);
        assert!((entities[0].max_confidence() - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn recanonicalizing_canonical_forms_is_stable() {
        let mentions = vec![
            mention("Dr. Jane Smith", EntityKind::Person, 0),
            mention("Smith, Jane", EntityKind::Person, 30),
            mention("Acme Corp", EntityKind::Org, 60),
        ];
        let first = canonicalizer().canonicalize(&mentions);

        // Feed the canonical forms back as raw mentions.
        let again: Vec<Mention> = first
            .iter()
            .enumerate()
            .map(|(i, e)| mention(&e.normalized, e.kind, i * 50))
            .collect();
        let second = canonicalizer().canonicalize(&again);

        let firsts: Vec<(&str, EntityKind)> = first
            .iter()
            .map(|e| (e.normalized.as_str(), e.kind))
            .collect();
        let seconds: Vec<(&str, EntityKind)> = second
            .iter()
            .map(|e| (e.normalized.as_str(), e.kind))
            .collect();
        assert_eq!(firsts, seconds);
    }

    #[test]
    fn email_and_url_normalization() {
        let mentions = vec![
            mention("Jane@EXAMPLE.COM", EntityKind::Email, 0),
            mention(
                "https://example.com/x?utm_source=mail&id=3",
                EntityKind::Url,
                30,
            ),
        ];
        let entities = canonicalizer().canonicalize(&mentions);
        assert!(entities.iter().any(|e| e.normalized == "Jane@example.com"));
        assert!(entities
            .iter()
            .any(|e| e.normalized == "https://example.com/x?id=3"));
    }
}
