//! Pure seat-position computation and anchor-seat sampling.
//!
//! Everything here is deterministic floating-point math with no I/O; the
//! same `sections` map always yields byte-identical output.

use std::collections::BTreeMap;

use crate::model::{RowLabel, Seat, SectionParams, Tier};

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The three rows emitted per section, in row-index order.
const ROW_SLOTS: [RowLabel; 3] = [RowLabel::Front, RowLabel::Middle, RowLabel::Back];

fn row_index(label: RowLabel, rows: u32) -> u32 {
    match label {
        RowLabel::Front => 0,
        RowLabel::Middle => rows / 2,
        RowLabel::Back => rows.saturating_sub(1),
    }
}

fn seat_at(section_id: &str, params: &SectionParams, row: RowLabel) -> Seat {
    let r = row_index(row, params.rows) as f64;
    let current_radius = params.inner_radius + r * params.row_depth;
    let current_height = params.base_height + r * params.row_rise;
    let azimuth_rad = params.angle.to_radians();
    let x = current_radius * azimuth_rad.sin();
    let y = current_radius * azimuth_rad.cos();
    let z = current_height;
    let look_angle = (-x).atan2(-y).to_degrees();

    Seat {
        id: format!("{section_id}_{}_1", row.as_str()),
        section: section_id.to_string(),
        row,
        seat: 1,
        tier: params.tier,
        x: round_to(x, 3),
        y: round_to(y, 3),
        z: round_to(z, 3),
        look_angle: round_to(look_angle, 2),
    }
}

/// Computes the three canonical seats (front/middle/back) for every section.
///
/// `sections` should already be filtered by `selected_section_ids` by the
/// caller; this function has no knowledge of that filter.
pub fn generate_all_seats(sections: &BTreeMap<String, SectionParams>) -> Vec<Seat> {
    let mut seats = Vec::with_capacity(sections.len() * ROW_SLOTS.len());
    for (section_id, params) in sections {
        for &row in &ROW_SLOTS {
            seats.push(seat_at(section_id, params, row));
        }
    }
    seats
}

/// Samples a representative anchor subset from `all_seats`, grouped by tier.
///
/// Within each of `{Lower, Mid, Upper}`, sections are sorted lexicographically
/// by id; if three or more sections are present, only the first, middle, and
/// last are sampled, else all are used. For each sampled section, the
/// front-row and back-row center seats are taken. Output preserves tier
/// order lower -> mid -> upper, then section order within each tier.
pub fn anchor_seats(sections: &BTreeMap<String, SectionParams>, all_seats: &[Seat]) -> Vec<Seat> {
    let mut by_tier: BTreeMap<Tier, Vec<&String>> = BTreeMap::new();
    for (section_id, params) in sections {
        if matches!(params.tier, Tier::Lower | Tier::Mid | Tier::Upper) {
            by_tier.entry(params.tier).or_default().push(section_id);
        }
    }

    let mut result = Vec::new();
    for tier in [Tier::Lower, Tier::Mid, Tier::Upper] {
        let Some(mut ids) = by_tier.remove(&tier) else {
            continue;
        };
        ids.sort();
        let sampled: Vec<&String> = if ids.len() >= 3 {
            let mid = ids.len() / 2;
            vec![ids[0], ids[mid], ids[ids.len() - 1]]
        } else {
            ids
        };

        for section_id in sampled {
            for seat in all_seats {
                if &seat.section != section_id {
                    continue;
                }
                if seat.row == RowLabel::Front || seat.row == RowLabel::Back {
                    result.push(seat.clone());
                }
            }
        }
    }
    result
}

/// Resolves `seats_to_render`: `custom_seats` against `all_seats` if
/// provided, else `anchor_seats`.
pub fn seats_to_render<'a>(
    custom_seats: Option<&std::collections::BTreeSet<String>>,
    all_seats: &'a [Seat],
    anchor: &'a [Seat],
) -> Vec<&'a Seat> {
    match custom_seats {
        Some(ids) => all_seats.iter().filter(|s| ids.contains(&s.id)).collect(),
        None => anchor.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn section_101() -> SectionParams {
        SectionParams {
            tier: Tier::Lower,
            angle: 0.0,
            inner_radius: 18.0,
            rows: 21,
            row_depth: 0.85,
            row_rise: 0.4,
            base_height: 2.0,
        }
    }

    #[test]
    fn s1_front_middle_back_positions() {
        let mut sections = BTreeMap::new();
        sections.insert("101".to_string(), section_101());
        let seats = generate_all_seats(&sections);
        assert_eq!(seats.len(), 3);

        let front = seats.iter().find(|s| s.id == "101_Front_1").unwrap();
        assert_eq!((front.x, front.y, front.z), (0.0, 18.0, 2.0));
        assert_eq!(front.look_angle, -180.0);

        let middle = seats.iter().find(|s| s.id == "101_Middle_1").unwrap();
        assert_eq!((middle.x, middle.y, middle.z), (0.0, 26.5, 6.0));

        let back = seats.iter().find(|s| s.id == "101_Back_1").unwrap();
        assert_eq!((back.x, back.y, back.z), (0.0, 35.0, 10.0));
    }

    #[test]
    fn determinism() {
        let mut sections = BTreeMap::new();
        sections.insert("101".to_string(), section_101());
        let a = generate_all_seats(&sections);
        let b = generate_all_seats(&sections);
        assert_eq!(a, b);
    }

    #[test]
    fn single_row_section_still_emits_three_coincident_seats() {
        let mut sections = BTreeMap::new();
        let mut params = section_101();
        params.rows = 1;
        sections.insert("900".to_string(), params);
        let seats = generate_all_seats(&sections);
        assert_eq!(seats.len(), 3);
        assert!(seats.iter().all(|s| s.x == seats[0].x
            && s.y == seats[0].y
            && s.z == seats[0].z));
    }

    #[test]
    fn anchor_samples_first_middle_last_when_three_or_more() {
        let mut sections = BTreeMap::new();
        for id in ["101", "102", "103", "104"] {
            sections.insert(id.to_string(), section_101());
        }
        let all = generate_all_seats(&sections);
        let anchors = anchor_seats(&sections, &all);
        let sampled_sections: std::collections::BTreeSet<_> =
            anchors.iter().map(|s| s.section.clone()).collect();
        assert_eq!(
            sampled_sections,
            ["101", "103", "104"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn anchor_is_subset_of_all_seats_by_id() {
        let mut sections = BTreeMap::new();
        for id in ["101", "102", "103"] {
            sections.insert(id.to_string(), section_101());
        }
        let all = generate_all_seats(&sections);
        let anchors = anchor_seats(&sections, &all);
        let all_ids: std::collections::BTreeSet<_> = all.iter().map(|s| &s.id).collect();
        assert!(anchors.iter().all(|s| all_ids.contains(&s.id)));
    }
}
