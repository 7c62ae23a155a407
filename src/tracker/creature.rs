//! Creature records and the typed inputs that create or edit them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Stable creature identifier. Allocated in creation order, so comparing ids
/// also compares creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureId(pub u64);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CreatureId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CreatureId)
    }
}

/// One tracked combatant.
///
/// Field names serialize in camelCase so stored lists and import tokens stay
/// readable by the page scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub max_hp: i32,
    /// May drop to zero or below (defeated) and may exceed `max_hp`.
    pub current_hp: i32,
    #[serde(default)]
    pub temp_hp: i32,
    pub ac: i32,
    pub initiative_bonus: i32,
    /// Last rolled total; 0 until the first roll.
    pub initiative: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_locked: bool,
}

impl Creature {
    /// Build a fresh, unrolled creature from a validated template.
    pub fn from_template(id: CreatureId, name: String, template: &CreatureTemplate) -> Self {
        Self {
            id,
            name,
            max_hp: template.hp,
            current_hp: template.hp,
            temp_hp: 0,
            ac: template.ac,
            initiative_bonus: template.initiative_bonus,
            initiative: 0,
            notes: template.notes.clone(),
            is_locked: false,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn health(&self) -> HealthBand {
        HealthBand::of(self.current_hp, self.max_hp)
    }

    pub fn notes_preview(&self) -> NotesPreview {
        NotesPreview::of(&self.notes)
    }

    /// Overwrite one attribute.
    pub fn apply(&mut self, field: CreatureField) {
        match field {
            CreatureField::MaxHp(v) => self.max_hp = v,
            CreatureField::CurrentHp(v) => self.current_hp = v,
            CreatureField::TempHp(v) => self.temp_hp = v,
            CreatureField::Ac(v) => self.ac = v,
            CreatureField::Initiative(v) => self.initiative = v,
            CreatureField::Notes(v) => self.notes = v,
        }
    }

    /// Current value of a numeric field, by its wire name.
    fn numeric(&self, field: &str) -> Result<i32, ValidationError> {
        match field {
            "maxHp" => Ok(self.max_hp),
            "currentHp" => Ok(self.current_hp),
            "tempHp" => Ok(self.temp_hp),
            "ac" => Ok(self.ac),
            "initiative" => Ok(self.initiative),
            "notes" => Err(ValidationError::NotNumeric("notes")),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Health colouring bucket shown by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthBand {
    Defeated,
    Healthy,
    Wounded,
    Critical,
}

impl HealthBand {
    pub fn of(current_hp: i32, max_hp: i32) -> Self {
        if current_hp <= 0 {
            return HealthBand::Defeated;
        }
        match max_hp {
            0 => return HealthBand::Healthy,
            // negative percentage
            m if m < 0 => return HealthBand::Critical,
            _ => {}
        }
        // percent > 66 / > 33, compared without floating point
        let scaled = i64::from(current_hp) * 100;
        let max = i64::from(max_hp);
        if scaled > 66 * max {
            HealthBand::Healthy
        } else if scaled > 33 * max {
            HealthBand::Wounded
        } else {
            HealthBand::Critical
        }
    }
}

/// First two lines of a creature's notes, for the collapsed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPreview {
    pub preview: String,
    pub has_more: bool,
    pub remaining: String,
}

impl NotesPreview {
    pub fn of(notes: &str) -> Self {
        let lines: Vec<&str> = notes.split('\n').collect();
        let cut = lines.len().min(2);
        Self {
            preview: lines[..cut].join("\n"),
            has_more: lines.len() > 2,
            remaining: lines[cut..].join("\n"),
        }
    }
}

/// A single-field edit. One variant per editable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatureField {
    MaxHp(i32),
    CurrentHp(i32),
    TempHp(i32),
    Ac(i32),
    Initiative(i32),
    Notes(String),
}

impl CreatureField {
    /// Parse a wire field name (`maxHp`, `currentHp`, `tempHp`, `ac`,
    /// `initiative`, `notes`) and its raw value.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        let field = field.trim();
        if field == "notes" {
            return Ok(CreatureField::Notes(value.to_string()));
        }
        let name = wire_name(field)?;
        let v = parse_int(name, value)?;
        Ok(match name {
            "maxHp" => CreatureField::MaxHp(v),
            "currentHp" => CreatureField::CurrentHp(v),
            "tempHp" => CreatureField::TempHp(v),
            "ac" => CreatureField::Ac(v),
            _ => CreatureField::Initiative(v),
        })
    }

    /// Build the edit that nudges a numeric field of `creature` by `delta`
    /// (the stepper buttons). Saturates instead of overflowing.
    pub fn stepped(creature: &Creature, field: &str, delta: &str) -> Result<Self, ValidationError> {
        let field = field.trim();
        let current = creature.numeric(field)?;
        let delta = parse_int("delta", delta)?;
        Self::parse(field, &current.saturating_add(delta).to_string())
    }

    pub fn name(&self) -> &'static str {
        match self {
            CreatureField::MaxHp(_) => "maxHp",
            CreatureField::CurrentHp(_) => "currentHp",
            CreatureField::TempHp(_) => "tempHp",
            CreatureField::Ac(_) => "ac",
            CreatureField::Initiative(_) => "initiative",
            CreatureField::Notes(_) => "notes",
        }
    }
}

fn wire_name(field: &str) -> Result<&'static str, ValidationError> {
    match field {
        "maxHp" => Ok("maxHp"),
        "currentHp" => Ok("currentHp"),
        "tempHp" => Ok("tempHp"),
        "ac" => Ok("ac"),
        "initiative" => Ok("initiative"),
        other => Err(ValidationError::UnknownField(other.to_string())),
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i32, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger {
            field,
            value: value.to_string(),
        })
}

/// Validated input of the add-creature form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureTemplate {
    pub name: String,
    pub hp: i32,
    pub ac: i32,
    pub initiative_bonus: i32,
    pub notes: String,
}

impl CreatureTemplate {
    /// Validate the raw form strings.
    pub fn parse(
        name: &str,
        hp: &str,
        ac: &str,
        initiative_bonus: &str,
        notes: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(Self {
            name: name.to_string(),
            hp: parse_int("hp", hp)?,
            ac: parse_int("ac", ac)?,
            initiative_bonus: parse_int("initiativeBonus", initiative_bonus)?,
            notes: notes.to_string(),
        })
    }

    /// Display name of the `k`-th (1-based) creature in a batch of `amount`.
    pub fn name_for(&self, k: usize, amount: usize) -> String {
        if amount > 1 {
            format!("{} {}", self.name, k)
        } else {
            self.name.clone()
        }
    }
}

/// Parse the batch size of an add request, between 1 and `max`.
pub fn parse_amount(raw: &str, max: usize) -> Result<usize, ValidationError> {
    let raw = raw.trim();
    let n: i64 = raw.parse().map_err(|_| ValidationError::NotAnInteger {
        field: "amount",
        value: raw.to_string(),
    })?;
    if n < 1 {
        return Err(ValidationError::AmountTooSmall(n));
    }
    match usize::try_from(n) {
        Ok(amount) if amount <= max => Ok(amount),
        _ => Err(ValidationError::AmountTooLarge {
            max,
            got: raw.to_string(),
        }),
    }
}

/// Manual reorder direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(ValidationError::UnknownDirection(other.to_string())),
        }
    }
}
