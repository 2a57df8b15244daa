//! Text-level repair of calendar feeds before parsing.
//!
//! Some producers write Windows zone names into `TZID` parameters. They are
//! rewritten to IANA names here, while the feed is still plain text.

use calorg_core::config::TzidAlias;

/// ## Summary
/// Replaces every `TZID=<from>` (quoted or not) with `TZID=<to>` for each alias.
///
/// Aliases are applied in order. Text without matches is returned unchanged.
#[must_use]
#[tracing::instrument(skip_all, fields(len = input.len(), aliases = aliases.len()))]
pub fn repair_timezones(input: &str, aliases: &[TzidAlias]) -> String {
    let mut repaired = input.to_string();

    for alias in aliases.iter().filter(|alias| !alias.from.is_empty()) {
        let replacement = format!("TZID={}", alias.to);
        let quoted = format!("TZID=\"{}\"", alias.from);
        let plain = format!("TZID={}", alias.from);

        let hits = repaired.matches(&quoted).count() + repaired.matches(&plain).count();
        if hits == 0 {
            continue;
        }

        repaired = repaired
            .replace(&quoted, &replacement)
            .replace(&plain, &replacement);
        tracing::debug!(from = %alias.from, to = %alias.to, hits, "Repaired TZID parameters");
    }

    repaired
}
