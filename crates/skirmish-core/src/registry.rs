//! Entity registry: the process-wide directory of live entities.
//!
//! The registry maps stable [`EntityId`]s to [`EntityRecord`]s and keeps two
//! partitioned indexes — by [`EntityKind`] and by [`Team`] — as strict views
//! of the master map. Every insert and remove updates all three structures
//! together, so a record is never visible in an index it does not belong to.
//!
//! # Ownership
//!
//! The registry exclusively owns its records. Other subsystems hold ids and
//! re-resolve them through [`Registry::get`] before every use; a returned
//! reference is valid only until the next registry mutation. The registry
//! never holds references into the world: liveness is checked through the
//! [`HandleResolver`] seam during maintenance.
//!
//! # Maintenance
//!
//! [`Registry::maintain`] runs at its own coarse interval, decoupled from
//! per-entity AI cadences. It refreshes every record's cached position and
//! activity flag first, then sweeps records whose id no longer resolves.
//! The refresh-before-sweep order means a record invalidated this pass was
//! still visible to queries issued earlier in the same tick, and no dangling
//! record survives more than one interval after its entity is destroyed
//! out-of-band.
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{EntityId, EntityKind, Team};
//! use skirmish_core::registry::{Registration, Registry};
//! use glam::Vec3;
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Registration::new(EntityId::new(1), EntityKind::Player, Team::Players, "alice")
//!         .at(Vec3::ZERO)
//!         .with_health(100, 100),
//! );
//!
//! let closest = registry.find_closest(EntityKind::Player, Vec3::new(3.0, 0.0, 0.0), 10.0);
//! assert_eq!(closest.unwrap().id(), EntityId::new(1));
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entity::{EntityId, EntityKind, Team};

// =============================================================================
// Annotations
// =============================================================================

/// Value stored in a record's annotation map.
///
/// A closed set of variants rather than an open "any" type: cross-cutting
/// flags stay statically checkable while the key space stays free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// Boolean flag (e.g. `"isDead"`).
    Bool(bool),
    /// Plain number.
    Number(f64),
    /// Simulation-clock timestamp in seconds (e.g. `"deathTime"`).
    Timestamp(f64),
    /// Free-form text.
    Text(String),
}

// =============================================================================
// Records
// =============================================================================

/// One live entity's descriptive metadata.
///
/// Records cache position and activity rather than reading them live; the
/// cache is refreshed by [`Registry::maintain`] and is never staler than one
/// maintenance interval while the entity is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    id: EntityId,
    kind: EntityKind,
    team: Team,
    display_name: String,
    position: Vec3,
    heading: f32,
    active: bool,
    last_update: f64,
    health: i32,
    max_health: i32,
    detection_range: f32,
    annotations: HashMap<String, AnnotationValue>,
}

impl EntityRecord {
    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's category.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the entity's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the operator-facing display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the last-known position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the last-known heading (yaw, radians).
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Returns whether the underlying entity was active at the last refresh.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the simulation-clock time of the last position refresh.
    #[must_use]
    pub const fn last_update(&self) -> f64 {
        self.last_update
    }

    /// Returns the last-reported current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Returns the last-reported maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Returns the detection-range hint seeded at registration, or zero.
    #[must_use]
    pub const fn detection_range(&self) -> f32 {
        self.detection_range
    }

    /// Returns an annotation by key.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations.get(key)
    }

    /// Euclidean distance from this record's last-known position.
    #[must_use]
    pub fn distance_to(&self, position: Vec3) -> f32 {
        self.position.distance(position)
    }
}

/// Registration descriptor handed to [`Registry::register`].
///
/// Optional capabilities (health, detection range) are declared up front by
/// the entity type instead of being probed for after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Unique identifier for the entity.
    pub id: EntityId,
    /// Entity category.
    pub kind: EntityKind,
    /// Entity team.
    pub team: Team,
    /// Operator-facing display name.
    pub display_name: String,
    /// Initial position.
    pub position: Vec3,
    /// Initial heading (yaw, radians).
    pub heading: f32,
    /// Current and maximum health, if the entity has a health unit.
    pub health: Option<(i32, i32)>,
    /// Detection radius, if the entity has a detection unit.
    pub detection_range: Option<f32>,
}

impl Registration {
    /// Creates a descriptor with no optional capabilities.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        team: Team,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            team,
            display_name: display_name.into(),
            position: Vec3::ZERO,
            heading: 0.0,
            health: None,
            detection_range: None,
        }
    }

    /// Sets the initial position.
    #[must_use]
    pub const fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial heading.
    #[must_use]
    pub const fn facing(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    /// Declares a health capability to seed into the record.
    #[must_use]
    pub const fn with_health(mut self, current: i32, max: i32) -> Self {
        self.health = Some((current, max));
        self
    }

    /// Declares a detection-range capability to seed into the record.
    #[must_use]
    pub const fn with_detection_range(mut self, range: f32) -> Self {
        self.detection_range = Some(range);
        self
    }
}

// =============================================================================
// Liveness resolution
// =============================================================================

/// Snapshot of an entity's live transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveState {
    /// Current position.
    pub position: Vec3,
    /// Current heading (yaw, radians).
    pub heading: f32,
    /// Whether the entity is currently enabled in the world.
    pub active: bool,
}

/// Seam through which the registry checks entity liveness.
///
/// Implemented by the simulation world. `resolve` returning `None` means the
/// entity no longer exists and its record will be swept on the next
/// maintenance pass.
pub trait HandleResolver {
    /// Resolves an id to the entity's live state, or `None` if destroyed.
    fn resolve(&self, id: EntityId) -> Option<LiveState>;
}

// =============================================================================
// Events
// =============================================================================

/// Lifecycle notification emitted by the registry.
///
/// Drained by the simulation root and handed to the external replication
/// layer, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A record was inserted.
    Registered {
        /// Id of the new record.
        id: EntityId,
        /// Category of the new record.
        kind: EntityKind,
        /// Team of the new record.
        team: Team,
    },
    /// A record was removed.
    Unregistered {
        /// Id of the removed record.
        id: EntityId,
        /// Category of the removed record.
        kind: EntityKind,
        /// Team of the removed record.
        team: Team,
    },
    /// A record's health changed.
    HealthChanged {
        /// Id of the updated record.
        id: EntityId,
        /// New current health.
        health: i32,
        /// New maximum health.
        max_health: i32,
    },
}

// =============================================================================
// Registry
// =============================================================================

/// Categorized, spatially-searchable directory of live entities.
///
/// The master map is a `BTreeMap` for deterministic iteration; the partition
/// indexes hold ids in insertion order, which is also the documented
/// tie-break order for closest-entity queries.
#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<EntityId, EntityRecord>,
    by_kind: HashMap<EntityKind, Vec<EntityId>>,
    by_team: HashMap<Team, Vec<EntityId>>,
    events: Vec<RegistryEvent>,
}

impl Registry {
    /// Creates an empty registry with all partitions pre-seeded.
    #[must_use]
    pub fn new() -> Self {
        let mut by_kind = HashMap::new();
        for kind in EntityKind::ALL {
            by_kind.insert(kind, Vec::new());
        }
        let mut by_team = HashMap::new();
        for team in Team::ALL {
            by_team.insert(team, Vec::new());
        }
        Self {
            records: BTreeMap::new(),
            by_kind,
            by_team,
            events: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers an entity.
    ///
    /// Registering an id that is already present is a logged no-op: spawn
    /// notifications can race with maintenance sweeps, and losing that race
    /// must not be fatal.
    pub fn register(&mut self, registration: Registration) {
        let id = registration.id;
        if self.records.contains_key(&id) {
            warn!(%id, name = %registration.display_name, "entity already registered");
            return;
        }

        let (health, max_health) = registration.health.unwrap_or((0, 0));
        let record = EntityRecord {
            id,
            kind: registration.kind,
            team: registration.team,
            display_name: registration.display_name,
            position: registration.position,
            heading: registration.heading,
            active: true,
            last_update: 0.0,
            health,
            max_health,
            detection_range: registration.detection_range.unwrap_or(0.0),
            annotations: HashMap::new(),
        };

        let kind = record.kind;
        let team = record.team;
        debug!(%id, %kind, %team, name = %record.display_name, "registered entity");

        self.records.insert(id, record);
        self.kind_index_mut(kind).push(id);
        self.team_index_mut(team).push(id);
        self.events.push(RegistryEvent::Registered { id, kind, team });
    }

    /// Unregisters an entity. Absent ids are a no-op.
    pub fn unregister(&mut self, id: EntityId) {
        let Some(record) = self.records.remove(&id) else {
            return;
        };
        let kind = record.kind;
        let team = record.team;
        self.kind_index_mut(kind).retain(|entry| *entry != id);
        self.team_index_mut(team).retain(|entry| *entry != id);
        debug!(%id, %kind, name = %record.display_name, "unregistered entity");
        self.events.push(RegistryEvent::Unregistered { id, kind, team });
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Returns the record for an id.
    ///
    /// The reference is valid only until the next registry mutation; callers
    /// holding ids across ticks must resolve again before each use.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    /// Returns the record for an id only if the entity is currently active.
    ///
    /// This is the resolution step for weak target references: a missing or
    /// inactive record reads as "no target".
    #[must_use]
    pub fn resolve_active(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id).filter(|record| record.active)
    }

    /// Returns whether an id is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the total number of registered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Finds the active record of `kind` closest to `origin`, strictly
    /// within `max_distance`.
    ///
    /// Linear scan of the kind partition; inactive records are skipped. Ties
    /// go to the first-encountered record in insertion order, which is not
    /// behaviorally significant.
    #[must_use]
    pub fn find_closest(
        &self,
        kind: EntityKind,
        origin: Vec3,
        max_distance: f32,
    ) -> Option<&EntityRecord> {
        self.closest_in(self.kind_index(kind), origin, max_distance)
    }

    /// Finds the active record on `team` closest to `origin`, strictly
    /// within `max_distance`.
    #[must_use]
    pub fn find_closest_by_team(
        &self,
        team: Team,
        origin: Vec3,
        max_distance: f32,
    ) -> Option<&EntityRecord> {
        self.closest_in(self.team_index(team), origin, max_distance)
    }

    fn closest_in(&self, ids: &[EntityId], origin: Vec3, max_distance: f32) -> Option<&EntityRecord> {
        let mut closest: Option<&EntityRecord> = None;
        let mut min_distance = max_distance;
        for id in ids {
            let Some(record) = self.records.get(id) else {
                continue;
            };
            if !record.active {
                continue;
            }
            let distance = record.distance_to(origin);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(record);
            }
        }
        closest
    }

    /// Collects all active records within `radius` of `origin`, optionally
    /// filtered by kind and/or team.
    ///
    /// Scans the most specific partition available (kind, else team, else the
    /// full record set) and applies the other predicate on top. Results are
    /// in insertion/iteration order, not distance-sorted.
    #[must_use]
    pub fn find_in_radius(
        &self,
        origin: Vec3,
        radius: f32,
        kind: Option<EntityKind>,
        team: Option<Team>,
    ) -> Vec<&EntityRecord> {
        let scan: Vec<EntityId> = match (kind, team) {
            (Some(k), _) => self.kind_index(k).to_vec(),
            (None, Some(t)) => self.team_index(t).to_vec(),
            (None, None) => self.records.keys().copied().collect(),
        };

        let mut result = Vec::new();
        for id in scan {
            let Some(record) = self.records.get(&id) else {
                continue;
            };
            if !record.active || record.distance_to(origin) > radius {
                continue;
            }
            if kind.is_some_and(|k| record.kind != k) {
                continue;
            }
            if team.is_some_and(|t| record.team != t) {
                continue;
            }
            result.push(record);
        }
        result
    }

    /// Returns all active records of `kind`, in insertion order.
    #[must_use]
    pub fn records_by_kind(&self, kind: EntityKind) -> Vec<&EntityRecord> {
        self.kind_index(kind)
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| record.active)
            .collect()
    }

    /// Returns all active records on `team`, in insertion order.
    #[must_use]
    pub fn records_by_team(&self, team: Team) -> Vec<&EntityRecord> {
        self.team_index(team)
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| record.active)
            .collect()
    }

    /// Counts active records of `kind`.
    #[must_use]
    pub fn count_by_kind(&self, kind: EntityKind) -> usize {
        self.kind_index(kind)
            .iter()
            .filter(|id| self.records.get(id).is_some_and(|r| r.active))
            .count()
    }

    /// Counts active records on `team`.
    #[must_use]
    pub fn count_by_team(&self, team: Team) -> usize {
        self.team_index(team)
            .iter()
            .filter(|id| self.records.get(id).is_some_and(|r| r.active))
            .count()
    }

    // -------------------------------------------------------------------------
    // Updates
    // -------------------------------------------------------------------------

    /// Updates a record's health. Absent ids are a no-op.
    ///
    /// `max_health` only takes effect when positive, so callers that report
    /// current health alone can pass `None`.
    pub fn update_health(&mut self, id: EntityId, health: i32, max_health: Option<i32>) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        record.health = health;
        if let Some(max) = max_health {
            if max > 0 {
                record.max_health = max;
            }
        }
        self.events.push(RegistryEvent::HealthChanged {
            id,
            health: record.health,
            max_health: record.max_health,
        });
    }

    /// Sets a free-form annotation on a record. Absent ids are a no-op.
    pub fn set_annotation(&mut self, id: EntityId, key: impl Into<String>, value: AnnotationValue) {
        if let Some(record) = self.records.get_mut(&id) {
            record.annotations.insert(key.into(), value);
        }
    }

    /// Reads an annotation from a record.
    #[must_use]
    pub fn annotation(&self, id: EntityId, key: &str) -> Option<&AnnotationValue> {
        self.records.get(&id).and_then(|record| record.annotation(key))
    }

    // -------------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------------

    /// Runs one maintenance pass: refresh, then sweep.
    ///
    /// Phase one refreshes every record's cached position, heading and
    /// activity flag through `resolver`, stamping `now`. Phase two removes
    /// records whose id no longer resolves. All refreshes complete before the
    /// sweep begins.
    pub fn maintain(&mut self, resolver: &dyn HandleResolver, now: f64) {
        for record in self.records.values_mut() {
            if let Some(live) = resolver.resolve(record.id) {
                record.position = live.position;
                record.heading = live.heading;
                record.active = live.active;
                record.last_update = now;
            }
        }

        let stale: Vec<EntityId> = self
            .records
            .keys()
            .copied()
            .filter(|id| resolver.resolve(*id).is_none())
            .collect();
        for id in stale {
            debug!(%id, "sweeping unresolvable record");
            self.unregister(id);
        }
    }

    /// Removes every record and clears both partitions. Emits no events.
    pub fn clear(&mut self) {
        self.records.clear();
        for ids in self.by_kind.values_mut() {
            ids.clear();
        }
        for ids in self.by_team.values_mut() {
            ids.clear();
        }
    }

    /// Drains all queued lifecycle events.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn kind_index(&self, kind: EntityKind) -> &[EntityId] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }

    fn team_index(&self, team: Team) -> &[EntityId] {
        self.by_team.get(&team).map_or(&[], Vec::as_slice)
    }

    fn kind_index_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityId> {
        self.by_kind.entry(kind).or_default()
    }

    fn team_index_mut(&mut self, team: Team) -> &mut Vec<EntityId> {
        self.by_team.entry(team).or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
