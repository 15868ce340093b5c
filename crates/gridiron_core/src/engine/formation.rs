//! Formation and personnel model.
//!
//! Maps a formation's personnel table onto a full roster to produce the 11
//! players actually on the field, and derives the rush/coverage split from
//! the defensive call. Selection respects depth-chart order (roster order)
//! and tolerates generic position aliases; an unfillable slot is a loud
//! configuration error because guessing would corrupt snap accounting.

use crate::config::PersonnelTable;
use crate::error::{Result, SimError};
use crate::models::{BlitzPackage, Player, Position};
use log::{debug, warn};

/// Select the ordered on-field subset of `roster` for a personnel table.
///
/// For each required slot, players listed at exactly that position are
/// taken first in depth-chart order; remaining vacancies are filled by
/// alias-compatible players (a generic LB can line up at MLB). The same
/// player is never fielded twice.
pub fn select_on_field<'a>(
    roster: &'a [Player],
    table: &PersonnelTable,
    formation_name: &str,
) -> Result<Vec<&'a Player>> {
    if roster.is_empty() {
        return Err(SimError::EmptyRoster(formation_name.to_string()));
    }

    let mut used = vec![false; roster.len()];
    let mut on_field: Vec<&Player> = Vec::with_capacity(11);

    for &(slot, count) in table {
        let mut filled = 0u8;

        // Exact position matches first, in roster order.
        for (i, player) in roster.iter().enumerate() {
            if filled == count {
                break;
            }
            if !used[i] && player.position == slot {
                used[i] = true;
                on_field.push(player);
                filled += 1;
            }
        }

        // Alias-compatible fills for whatever is left.
        for (i, player) in roster.iter().enumerate() {
            if filled == count {
                break;
            }
            if !used[i] && player.position.fills(slot) {
                debug!(
                    "{} fills {} slot in {} via alias ({})",
                    player.name, slot, formation_name, player.position
                );
                used[i] = true;
                on_field.push(player);
                filled += 1;
            }
        }

        if filled < count {
            return Err(SimError::UnfilledPosition {
                formation: formation_name.to_string(),
                position: slot.to_string(),
            });
        }
    }

    Ok(on_field)
}

/// Per-play rush/coverage assignment derived from the blitz package.
/// Indices point into the on-field defensive unit.
#[derive(Debug, Clone)]
pub struct RushPlan {
    pub rushers: Vec<usize>,
    pub coverage: Vec<usize>,
    /// True when the named package produced no rushers and the default
    /// four-man rush was substituted.
    pub defaulted: bool,
}

impl RushPlan {
    pub fn rush_count(&self) -> usize {
        self.rushers.len()
    }

    /// Rushers beyond the base four-man front.
    pub fn extra_rushers(&self) -> usize {
        self.rushers.len().saturating_sub(4)
    }
}

/// Build the rush plan for a defensive call. The defensive line always
/// rushes; the named package sends extra bodies. An assignment that ends
/// up with no rushers at all (a return unit asked to run a blitz package,
/// for example) falls back to a default four-man rush.
pub fn build_rush_plan(defense: &[&Player], blitz: BlitzPackage) -> RushPlan {
    let mut rushers: Vec<usize> = defense
        .iter()
        .enumerate()
        .filter(|(_, p)| p.position.is_defensive_line())
        .map(|(i, _)| i)
        .collect();

    let send = |indices: &mut Vec<usize>, pred: &dyn Fn(&Player) -> bool, limit: usize| {
        let mut sent = 0;
        for (i, player) in defense.iter().enumerate() {
            if sent == limit {
                break;
            }
            if !indices.contains(&i) && pred(player) {
                indices.push(i);
                sent += 1;
            }
        }
    };

    match blitz {
        BlitzPackage::BaseRush => {}
        BlitzPackage::MikeBlitz => {
            send(&mut rushers, &|p| matches!(p.position, Position::MLB | Position::ILB), 1);
        }
        BlitzPackage::SafetyBlitz => {
            send(&mut rushers, &|p| p.position == Position::SS, 1);
            if rushers.iter().all(|&i| defense[i].position.is_defensive_line()) {
                send(&mut rushers, &|p| p.position.is_safety(), 1);
            }
        }
        BlitzPackage::CornerBlitz => {
            send(&mut rushers, &|p| p.position == Position::CB, 1);
        }
        BlitzPackage::DoubleABlitz => {
            send(&mut rushers, &|p| p.position.is_linebacker(), 2);
        }
        BlitzPackage::ZeroBlitz => {
            send(&mut rushers, &|p| p.position.is_linebacker(), 3);
            send(&mut rushers, &|p| p.position == Position::SS, 1);
        }
    }

    let mut defaulted = false;
    if rushers.is_empty() {
        // No defensive linemen on the field and the package sent nobody.
        warn!("rush plan produced no rushers; defaulting to a four-man rush");
        rushers = (0..defense.len().min(4)).collect();
        defaulted = true;
    }

    let coverage: Vec<usize> =
        (0..defense.len()).filter(|i| !rushers.contains(i)).collect();

    RushPlan { rushers, coverage, defaulted }
}
