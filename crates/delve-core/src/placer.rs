//! Constrained random room placement.
//!
//! Guaranteed templates get a dedicated pass of up to 100 attempts each;
//! the remaining slots are filled by weighted draws under a global
//! attempt budget of `target x 50`. Acceptance requires the padded
//! bounding box to clear every room already placed. Shortfalls are
//! warnings; generation carries on with the rooms it got.

use crate::board::Board;
use crate::catalog::{pick_weighted, RoomTemplate};
use crate::config::GenConfig;
use crate::registry::{PlacedRoom, RoomRegistry};
use crate::spawn::{room_transform, Materializer, ObjectKind};
use crate::{Cell, GenRng};

/// Attempts per guaranteed template before giving up on it.
const GUARANTEED_ATTEMPTS: u32 = 100;
/// Weighted-placement attempt budget, per requested room.
const ATTEMPTS_PER_ROOM: usize = 50;

/// What the placement pass achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Guaranteed templates successfully placed.
    pub guaranteed_placed: u32,
    /// Guaranteed templates that ran out of attempts.
    pub guaranteed_failed: u32,
}

/// Draw a placement origin keeping `template`'s footprint in bounds.
fn random_origin(board_size: i32, template: &RoomTemplate, rng: &mut GenRng) -> Cell {
    (
        rng.rn2((board_size - template.width) as u32) as i32,
        rng.rn2((board_size - template.height) as u32) as i32,
    )
}

/// True if the footprint fits the board and clears all padded boxes.
fn can_place(
    board: &Board,
    registry: &RoomRegistry,
    pos: Cell,
    template: &RoomTemplate,
    spacing: i32,
) -> bool {
    if pos.0 < 0
        || pos.1 < 0
        || pos.0 + template.width > board.size()
        || pos.1 + template.height > board.size()
    {
        return false;
    }
    !registry.collides(pos, (template.width, template.height), spacing)
}

/// Accept a placement: stamp the footprint, materialize the room object,
/// and register the room.
fn place_room(
    board: &mut Board,
    registry: &mut RoomRegistry,
    template: &RoomTemplate,
    pos: Cell,
    tile_size: f32,
    materializer: &mut impl Materializer,
) {
    for x in pos.0..pos.0 + template.width {
        for y in pos.1..pos.1 + template.height {
            board.carve((x, y));
        }
    }

    let transform = room_transform(pos, (template.width, template.height), tile_size);
    let handle = materializer.instantiate(ObjectKind::Room, transform);

    let mut room = PlacedRoom::from_template(template, pos);
    room.handle = Some(handle);
    registry.push(room);
}

/// Run the full placement pass: guaranteed templates first, then
/// weighted draws until the target count or the attempt budget runs out.
pub fn place_rooms(
    cfg: &GenConfig,
    board: &mut Board,
    registry: &mut RoomRegistry,
    rng: &mut GenRng,
    materializer: &mut impl Materializer,
) -> PlacementOutcome {
    let mut outcome = PlacementOutcome::default();
    // Guaranteed templates that placed; they leave the weighted pool.
    let mut placed_guaranteed = vec![false; cfg.catalog.len()];

    for (idx, template) in cfg.catalog.iter().enumerate() {
        if !template.guaranteed_spawn {
            continue;
        }
        let mut placed = false;
        for _ in 0..GUARANTEED_ATTEMPTS {
            let pos = random_origin(cfg.board_size, template, rng);
            if can_place(board, registry, pos, template, cfg.min_room_spacing) {
                place_room(board, registry, template, pos, cfg.tile_size, materializer);
                placed_guaranteed[idx] = true;
                placed = true;
                break;
            }
        }
        if placed {
            outcome.guaranteed_placed += 1;
        } else {
            outcome.guaranteed_failed += 1;
            log::warn!(
                "failed to place guaranteed room '{}' ({}x{}) after {GUARANTEED_ATTEMPTS} attempts",
                template.name,
                template.width,
                template.height
            );
        }
    }

    let budget = cfg.target_room_count * ATTEMPTS_PER_ROOM;
    let mut attempts = 0;
    while registry.len() < cfg.target_room_count && attempts < budget {
        attempts += 1;
        let Some(idx) = pick_weighted(&cfg.catalog, &placed_guaranteed, rng) else {
            // Every remaining candidate is a placed guaranteed template
            log::debug!("weighted pool exhausted after {attempts} attempts");
            break;
        };
        let template = &cfg.catalog[idx];
        let pos = random_origin(cfg.board_size, template, rng);
        if can_place(board, registry, pos, template, cfg.min_room_spacing) {
            place_room(board, registry, template, pos, cfg.tile_size, materializer);
            if template.guaranteed_spawn {
                // A guaranteed template that failed its own pass but
                // landed here still leaves the pool.
                placed_guaranteed[idx] = true;
                outcome.guaranteed_placed += 1;
                outcome.guaranteed_failed -= 1;
            }
        }
    }

    if registry.len() < cfg.target_room_count {
        log::warn!(
            "placed {} of {} requested rooms before the attempt budget ran out",
            registry.len(),
            cfg.target_room_count
        );
    }

    outcome
}
