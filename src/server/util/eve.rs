//! EVE Online-specific utility functions and constants.

use std::collections::HashSet;

/// ESI hard limit for names per `POST /universe/ids/` request.
pub const ESI_IDS_REQUEST_LIMIT: usize = 500;

/// Corporation ids below this are NPC corporations.
///
/// Player corporations are allocated from 98,000,000 upward; the NPC corporations seeded by
/// CCP all sit in the 1,000,000 range.
pub const NPC_CORPORATION_ID_LIMIT: i64 = 2_000_000;

/// Ship types whose presence on a killmail as the victim marks an explorer kill.
///
/// Covers the covert ops frigates, exploration frigates and the starter corvettes.
pub const EXPLORER_SHIP_TYPE_IDS: [i64; 10] = [
    29248, 11188, 11192, 605, 11172, 607, 11182, 586, 33468, 33470,
];

/// Names shorter than this are ignored, EVE character names are at least 3 characters.
pub const MIN_NAME_LENGTH: usize = 3;

/// Display names swapped in for a few well known characters.
const NICKNAMES: [(&str, &str); 2] = [("Mynxee", "Space Mom"), ("Portia Tigana", "Tiggs")];

pub fn is_npc_corporation(corporation_id: i64) -> bool {
    corporation_id < NPC_CORPORATION_ID_LIMIT
}

pub fn is_explorer_ship(ship_type_id: i64) -> bool {
    EXPLORER_SHIP_TYPE_IDS.contains(&ship_type_id)
}

/// Returns the display nickname for a character name, if it has one.
pub fn nickname(name: &str) -> Option<&'static str> {
    NICKNAMES
        .iter()
        .find(|(character, _)| *character == name)
        .map(|(_, nickname)| *nickname)
}

/// Splits a pasted block of character names into the list to look up.
///
/// Lines may be separated by `\r\n`, `\n` or `\r`. Each name is trimmed, names shorter than
/// [`MIN_NAME_LENGTH`] characters are dropped and duplicates are removed keeping the first
/// occurrence. At most `max_names` names are returned.
///
/// # Arguments
/// - `input` - Raw `characters` form field
/// - `max_names` - Cap on the number of names returned
///
/// # Returns
/// Names in their original order
pub fn parse_names(input: &str, max_names: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for line in input.split(['\r', '\n']) {
        if names.len() >= max_names {
            break;
        }

        let name = line.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            continue;
        }

        if seen.insert(name) {
            names.push(name.to_string());
        }
    }

    names
}
