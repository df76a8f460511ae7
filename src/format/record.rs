// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Record, RecordKind};

use super::richtext::normalize_rich_text;

/// Formats a record into its canonical markdown document.
///
/// Section order is fixed per kind, sections are separated by exactly one blank line, and
/// there is no trailing newline. Identical records always produce byte-identical output;
/// nothing here depends on locale, time, or randomness.
pub fn format_record(record: &Record) -> String {
    let mut sections: Vec<String> = Vec::new();

    match record.kind() {
        RecordKind::Story => {
            // The triad is always emitted, empty fields included, so the shape of a story
            // stays recognizable while it is being drafted.
            sections.push(format!(
                "**As a** {}\n**I want** {}\n**So that** {}",
                record.role(),
                record.action(),
                record.benefit()
            ));

            push_rich_section(&mut sections, "**Background/Context:**", record.background());
        }
        RecordKind::Bug => {
            let title = record.role().trim();
            if !title.is_empty() {
                sections.push(title.to_owned());
            }

            push_rich_section(&mut sections, "**Scenario**", record.action());

            let expected = record.benefit().trim();
            if !expected.is_empty() {
                sections.push(format!("**Expected result**\n\n{expected}"));
            }

            push_rich_section(&mut sections, "**Actual result**", record.background());
        }
    }

    push_rich_section(
        &mut sections,
        "**Additional Information:**",
        record.additional_info(),
    );

    if let Some(section) = bullet_section("**Acceptance Criteria**", record.acceptance_criteria()) {
        sections.push(section);
    }
    if let Some(section) = bullet_section("**Technical Information**", record.technical_info()) {
        sections.push(section);
    }

    sections.join("\n\n")
}

fn push_rich_section(sections: &mut Vec<String>, header: &str, raw: &str) {
    if raw.trim().is_empty() {
        return;
    }
    let body = normalize_rich_text(raw);
    if body.is_empty() {
        return;
    }
    sections.push(format!("{header}\n\n{body}"));
}

/// Builds a bulleted section from items whose trimmed value is non-empty.
///
/// Items are trimmed at filter time, so an item containing only spaces counts as blank and
/// is dropped. Returns `None` when no item survives, omitting the whole section.
fn bullet_section(header: &str, items: &[String]) -> Option<String> {
    let kept = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>();
    if kept.is_empty() {
        return None;
    }

    let mut section = String::from(header);
    section.push('\n');
    for item in kept {
        section.push('\n');
        section.push_str("- ");
        section.push_str(item);
    }
    Some(section)
}

#[cfg(test)]
mod tests {
    use super::format_record;
    use crate::model::{Record, RecordKind};

    fn story(role: &str, action: &str, benefit: &str) -> Record {
        let mut record = Record::empty(RecordKind::Story);
        record.set_role(role);
        record.set_action(action);
        record.set_benefit(benefit);
        record
    }

    #[test]
    fn story_with_one_criterion_matches_expected_bytes() {
        let mut record = story("user", "export data", "I can back it up");
        record.acceptance_criteria_mut()[0] = "Export completes in <5s".to_owned();

        assert_eq!(
            format_record(&record),
            "**As a** user\n**I want** export data\n**So that** I can back it up\n\n\
             **Acceptance Criteria**\n\n- Export completes in <5s"
        );
    }

    #[test]
    fn bug_with_only_title_is_a_single_line() {
        let mut record = Record::empty(RecordKind::Bug);
        record.set_role("Button missing");
        assert_eq!(format_record(&record), "Button missing");
    }

    #[test]
    fn story_triad_keeps_empty_suffixes() {
        let record = Record::empty(RecordKind::Story);
        assert_eq!(
            format_record(&record),
            "**As a** \n**I want** \n**So that** "
        );
    }

    #[test]
    fn blank_criteria_list_omits_the_section() {
        let mut record = story("dev", "ship", "users smile");
        record.acceptance_criteria_mut()[0] = "   ".to_owned();
        record.technical_info_mut()[0] = String::new();

        let formatted = format_record(&record);
        assert!(!formatted.contains("Acceptance Criteria"));
        assert!(!formatted.contains("Technical Information"));
    }

    #[test]
    fn criteria_items_are_trimmed_and_blank_items_dropped() {
        let mut record = story("dev", "ship", "done");
        *record.acceptance_criteria_mut() = vec![
            "  first  ".to_owned(),
            "".to_owned(),
            "second".to_owned(),
        ];

        let formatted = format_record(&record);
        assert!(formatted.ends_with("**Acceptance Criteria**\n\n- first\n- second"));
    }

    #[test]
    fn story_background_is_normalized_rich_text() {
        let mut record = story("user", "log in", "my data is safe");
        record.set_background("<p>Logins use <strong>SSO</strong></p>");

        let formatted = format_record(&record);
        assert!(formatted.contains("**Background/Context:**\n\nLogins use **SSO**"));
    }

    #[test]
    fn bug_sections_appear_in_fixed_order() {
        let mut record = Record::empty(RecordKind::Bug);
        record.set_role("Save button missing");
        record.set_action("<p>Open the editor</p>");
        record.set_benefit("A save button is visible");
        record.set_background("<p>No button rendered</p>");

        assert_eq!(
            format_record(&record),
            "Save button missing\n\n\
             **Scenario**\n\nOpen the editor\n\n\
             **Expected result**\n\nA save button is visible\n\n\
             **Actual result**\n\nNo button rendered"
        );
    }

    #[test]
    fn additional_info_is_emitted_for_both_kinds() {
        let mut story_record = story("user", "filter", "less noise");
        story_record.set_additional_info("<p>ships behind a flag</p>");
        assert!(format_record(&story_record)
            .contains("**Additional Information:**\n\nships behind a flag"));

        let mut bug_record = Record::empty(RecordKind::Bug);
        bug_record.set_role("Broken link");
        bug_record.set_additional_info("seen on staging only");
        assert!(format_record(&bug_record)
            .contains("**Additional Information:**\n\nseen on staging only"));
    }

    #[test]
    fn formatting_twice_yields_identical_bytes() {
        let mut record = story("user", "export data", "I can back it up");
        record.set_background("<ul><li>nightly</li></ul>");
        assert_eq!(format_record(&record), format_record(&record));
    }

    #[test]
    fn no_trailing_newline_after_last_section() {
        let mut record = story("user", "export", "backup");
        record.acceptance_criteria_mut()[0] = "done".to_owned();
        let formatted = format_record(&record);
        assert!(!formatted.ends_with('\n'));
    }
}
