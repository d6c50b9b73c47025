//! The fixed set of simulated entities and their wishlist costs.

use std::collections::HashSet;
use std::path::Path;

use crate::error::RosterError;

/// A simulated coin.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique, non-empty name; also the seed source
    pub name: String,
    /// Cost charged against the budget when this coin is granted
    pub wishlist_cost: f64,
}

impl Entity {
    /// Creates a new entity.
    pub fn new(name: impl Into<String>, wishlist_cost: f64) -> Self {
        Self {
            name: name.into(),
            wishlist_cost,
        }
    }
}

/// Validated, ordered list of entities. Immutable for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    /// Builds a roster, checking names and costs.
    pub fn new(entities: Vec<Entity>) -> Result<Self, RosterError> {
        if entities.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut seen = HashSet::new();
        for entity in &entities {
            if entity.name.is_empty() {
                return Err(RosterError::invalid_entity(&entity.name, "empty coin name"));
            }
            if let Err(reason) = check_cost(entity.wishlist_cost) {
                return Err(RosterError::invalid_entity(&entity.name, reason));
            }
            if !seen.insert(entity.name.as_str()) {
                return Err(RosterError::DuplicateCoin(entity.name.clone()));
            }
        }
        Ok(Self { entities })
    }

    /// Parses CSV text with `coin` and `wishlist_won` columns.
    ///
    /// Column order is free and extra columns are ignored. Quoted fields are
    /// not supported.
    pub fn from_csv_str(text: &str) -> Result<Self, RosterError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, header) = lines.next().ok_or(RosterError::MissingColumn("coin"))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let coin_idx = column_index(&columns, "coin")?;
        let cost_idx = column_index(&columns, "wishlist_won")?;

        let mut entities = Vec::new();
        for (line, row) in lines {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() < columns.len() {
                return Err(RosterError::invalid_row(
                    line,
                    format!("expected {} fields, got {}", columns.len(), fields.len()),
                ));
            }
            let name = fields[coin_idx];
            if name.is_empty() {
                return Err(RosterError::invalid_row(line, "empty coin name"));
            }
            let cost: f64 = fields[cost_idx].parse().map_err(|_| {
                RosterError::invalid_row(line, format!("bad wishlist_won '{}'", fields[cost_idx]))
            })?;
            check_cost(cost).map_err(|reason| RosterError::invalid_row(line, reason))?;
            entities.push(Entity::new(name, cost));
        }

        Self::new(entities)
    }

    /// Loads a roster CSV from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_csv_str(&text)
    }

    /// Entities in file order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false for a constructed roster.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn check_cost(cost: f64) -> Result<(), String> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        Err(format!("wishlist_won must be a non-negative number, got {}", cost))
    }
}

fn column_index(columns: &[&str], name: &'static str) -> Result<usize, RosterError> {
    columns
        .iter()
        .position(|c| *c == name)
        .ok_or(RosterError::MissingColumn(name))
}
