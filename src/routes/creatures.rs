//! `/api/creatures/*` routes: the creature list and its mutations.
//!
//! Every successful call replies with the full ordered list so the page can
//! re-render from one snapshot.

use serde::Serialize;
use serde_json::{Value, json};

use crate::config;
use crate::error::ValidationError;
use crate::routes::notify::Notice;
use crate::routes::util::{get_param, parse_form_body, reply, require_param};
use crate::tracker::creature::{
    Creature, CreatureField, CreatureId, CreatureTemplate, Direction, HealthBand, NotesPreview,
    parse_amount,
};
use crate::tracker::state::{Tracker, with_tracker, with_tracker_mut};

/// A creature plus the values the list view derives from it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatureView<'a> {
    #[serde(flatten)]
    creature: &'a Creature,
    is_defeated: bool,
    health: HealthBand,
    notes_preview: NotesPreview,
}

impl<'a> From<&'a Creature> for CreatureView<'a> {
    fn from(creature: &'a Creature) -> Self {
        Self {
            creature,
            is_defeated: creature.is_defeated(),
            health: creature.health(),
            notes_preview: creature.notes_preview(),
        }
    }
}

/// `{"creatures":[...],"roll":{...}}` for the current tracker.
pub fn list_fields(tracker: &Tracker) -> Value {
    let views: Vec<CreatureView> = tracker.creatures().iter().map(CreatureView::from).collect();
    json!({ "creatures": views, "roll": tracker.roll_phase() })
}

fn current_list() -> Value {
    with_tracker(list_fields)
}

fn require_id(params: &[(String, String)]) -> Result<CreatureId, Notice> {
    let raw = require_param(params, "id")?;
    raw.parse()
        .map_err(|_| Notice::error(format!("Invalid id parameter: {}", raw)))
}

// ── GET /api/creatures ─────────────────────────────────────────────

pub fn handle_list_get(_query: &str) -> String {
    reply(Ok(current_list()))
}

// ── POST /api/creatures/add ────────────────────────────────────────

/// Body: `name, hp, ac, initiativeBonus, amount (default 1), notes`.
pub fn handle_add_post(body: &str) -> String {
    let params = parse_form_body(body);
    let result = parse_add(&params)
        .map_err(|e| Notice::from(&e))
        .map(|(template, amount)| {
            with_tracker_mut(|t| t.add_creatures(&template, amount));
            current_list()
        });
    reply(result)
}

fn parse_add(params: &[(String, String)]) -> Result<(CreatureTemplate, usize), ValidationError> {
    let template = CreatureTemplate::parse(
        get_param(params, "name").unwrap_or(""),
        get_param(params, "hp").unwrap_or(""),
        get_param(params, "ac").unwrap_or(""),
        get_param(params, "initiativeBonus").unwrap_or(""),
        get_param(params, "notes").unwrap_or(""),
    )?;
    let max_batch = config::current().max_batch;
    let amount = parse_amount(get_param(params, "amount").unwrap_or("1"), max_batch)?;
    Ok((template, amount))
}

// ── POST /api/creatures/remove ─────────────────────────────────────

pub fn handle_remove_post(body: &str) -> String {
    let params = parse_form_body(body);
    reply(require_id(&params).map(|id| {
        with_tracker_mut(|t| t.remove_creature(id));
        current_list()
    }))
}

// ── POST /api/creatures/update ─────────────────────────────────────

/// Body: `id, field` and either `value` (replace) or `delta` (stepper).
pub fn handle_update_post(body: &str) -> String {
    let params = parse_form_body(body);
    let result = (|| -> Result<Value, Notice> {
        let id = require_id(&params)?;
        let field = require_param(&params, "field")?;
        match (get_param(&params, "value"), get_param(&params, "delta")) {
            (Some(value), _) => {
                let edit = CreatureField::parse(field, value).map_err(|e| Notice::from(&e))?;
                with_tracker_mut(|t| t.update_creature(id, edit));
            }
            (None, Some(delta)) => {
                with_tracker_mut(|t| t.adjust_creature(id, field, delta))
                    .map_err(|e| Notice::from(&e))?;
            }
            (None, None) => return Err(Notice::error("Missing value parameter")),
        }
        Ok(current_list())
    })();
    reply(result)
}

// ── POST /api/creatures/lock ───────────────────────────────────────

pub fn handle_lock_post(body: &str) -> String {
    let params = parse_form_body(body);
    reply(require_id(&params).map(|id| {
        with_tracker_mut(|t| t.toggle_lock(id));
        current_list()
    }))
}

// ── POST /api/creatures/move ───────────────────────────────────────

/// Body: `id, direction=up|down`.
pub fn handle_move_post(body: &str) -> String {
    let params = parse_form_body(body);
    let result = (|| -> Result<Value, Notice> {
        let id = require_id(&params)?;
        let direction: Direction = require_param(&params, "direction")?
            .parse()
            .map_err(|e: ValidationError| Notice::from(&e))?;
        with_tracker_mut(|t| t.move_creature(id, direction));
        Ok(current_list())
    })();
    reply(result)
}

// ── POST /api/creatures/reset ──────────────────────────────────────

pub fn handle_reset_post(_body: &str) -> String {
    with_tracker_mut(|t| t.reset_creatures());
    reply(Ok(current_list()))
}
