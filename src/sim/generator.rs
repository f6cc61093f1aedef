//! Tunnel generator
//!
//! Owns every service (catalog, content library, powerup table, RNG) and all
//! mutable state. One `update(dt)` per frame: the difficulty is sampled first,
//! then expired dissolves are finalized, rings behind the traveler are
//! recycled and reconfigured one at a time, obstacles animate, and finally the
//! color pass runs over every ring.

use serde::Serialize;

use super::catalog::{Catalog, PowerupTable};
use super::color::{ColorUpdater, Gradient, LinearGradient, RingPalette};
use super::difficulty::{Difficulty, DifficultyClock};
use super::obstacle::{ContentLibrary, ObstacleContent};
use super::pattern::PatternSelector;
use super::pickup::{PickupChainState, PickupEngine};
use super::pool::RingPool;
use super::rng::RandomSource;
use super::state::{Ring, RingHandle, Traveler, TunnelEvent};
use crate::error::{GeneratorError, GeneratorResult};
use crate::settings::Settings;

/// Lifecycle of the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneratorStatus {
    /// Constructed, waiting for `start`
    Idle,
    Running,
    /// A missing collaborator stopped generation; see `disabled_reason`
    Disabled,
}

/// Read-only state for debug overlays
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub status: GeneratorStatus,
    pub seed: u64,
    pub difficulty: Difficulty,
    pub side_count: u32,
    /// Archetype of the run in progress
    pub archetype: Option<String>,
    pub run_length: u32,
    pub run_remaining: u32,
    pub rotation_slot: Option<u32>,
    pub last_step: u32,
    pub last_direction: i32,
    pub chain: PickupChainState,
    pub breather_remaining: u32,
    pub furthest_z: f32,
    pub dissolving: usize,
}

pub struct TunnelGenerator {
    settings: Settings,
    catalog: Catalog,
    library: ContentLibrary,
    powerups: PowerupTable,
    rng: RandomSource,
    clock: DifficultyClock,
    pool: RingPool,
    selector: PatternSelector,
    pickups: PickupEngine,
    colors: ColorUpdater,
    traveler: Option<Traveler>,
    side_count: u32,
    /// Seconds since `start`; dissolve timestamps use this clock
    now: f32,
    warmup_remaining: u32,
    breather_remaining: u32,
    status: GeneratorStatus,
    disabled_reason: Option<String>,
    events: Vec<TunnelEvent>,
}

impl std::fmt::Debug for TunnelGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelGenerator")
            .field("status", &self.status)
            .field("seed", &self.rng.seed())
            .field("side_count", &self.side_count)
            .field("rings", &self.pool.len())
            .field("now", &self.now)
            .field("colors", &self.colors)
            .finish()
    }
}

impl TunnelGenerator {
    pub fn new(
        settings: Settings,
        catalog: Catalog,
        library: ContentLibrary,
        powerups: PowerupTable,
        gradient: Box<dyn Gradient>,
    ) -> Self {
        Self {
            rng: RandomSource::new(0),
            clock: DifficultyClock::new(&settings.difficulty),
            pool: RingPool::new(&settings.pool),
            selector: PatternSelector::new(),
            pickups: PickupEngine::new(&settings.pickups),
            colors: ColorUpdater::new(&settings.color, gradient),
            side_count: settings.pool.side_count,
            traveler: None,
            now: 0.0,
            warmup_remaining: 0,
            breather_remaining: 0,
            status: GeneratorStatus::Idle,
            disabled_reason: None,
            events: Vec::new(),
            settings,
            catalog,
            library,
            powerups,
        }
    }

    /// Stock archetypes, templates, powerups and palette
    pub fn with_defaults(settings: Settings) -> Self {
        Self::new(
            settings,
            Catalog::standard(),
            ContentLibrary::standard(),
            PowerupTable::standard(),
            Box::new(LinearGradient::neon()),
        )
    }

    pub fn attach_traveler(&mut self, traveler: Traveler) {
        self.traveler = Some(traveler);
    }

    pub fn traveler(&self) -> Option<&Traveler> {
        self.traveler.as_ref()
    }

    /// Host-side handle for moving the traveler between frames
    pub fn traveler_mut(&mut self) -> Option<&mut Traveler> {
        self.traveler.as_mut()
    }

    /// Begin (or restart) a run from `seed`.
    ///
    /// Fails, and disables the generator, when no traveler is attached or a
    /// catalog archetype has no content template.
    pub fn start(&mut self, seed: u64) -> GeneratorResult<()> {
        if let Err(err) = self.validate() {
            self.disable(&err);
            return Err(err);
        }

        self.rng.reseed(seed);
        self.clock.reset();
        self.colors.reset_phase();
        self.pool.reset_sequence();
        self.now = 0.0;
        self.events.clear();
        self.disabled_reason = None;
        self.status = GeneratorStatus::Running;
        log::info!(
            "Tunnel run started (seed {}, {} rings, {} sides)",
            seed,
            self.pool.len(),
            self.side_count
        );

        if let Err(err) = self.rebuild_pool() {
            self.disable(&err);
            return Err(err);
        }
        Ok(())
    }

    fn validate(&self) -> GeneratorResult<()> {
        self.settings.validate()?;
        if self.traveler.is_none() {
            return Err(GeneratorError::MissingTraveler);
        }
        for archetype in &self.catalog.archetypes {
            if self.library.get(&archetype.template).is_none() {
                return Err(GeneratorError::MissingTemplate {
                    archetype: archetype.name.clone(),
                    template: archetype.template.clone(),
                });
            }
        }
        Ok(())
    }

    fn disable(&mut self, err: &GeneratorError) {
        log::error!("Tunnel generator disabled: {}", err);
        self.status = GeneratorStatus::Disabled;
        self.disabled_reason = Some(err.to_string());
    }

    /// Rebuild the whole pool for a new side count.
    ///
    /// Run and chain state are discarded before any ring is placed. While idle
    /// the side count is stored and used by the next `start`.
    pub fn rebuild(&mut self, side_count: u32) -> GeneratorResult<()> {
        if side_count == 0 {
            return Err(GeneratorError::InvalidSetting {
                name: "side_count",
                value: 0.0,
                expected: "at least one side",
            });
        }
        self.side_count = side_count;
        if self.status != GeneratorStatus::Running {
            return Ok(());
        }

        log::info!("Rebuilding tunnel for {} sides", side_count);
        if let Err(err) = self.rebuild_pool() {
            self.disable(&err);
            return Err(err);
        }
        self.events.push(TunnelEvent::Rebuilt { side_count });
        Ok(())
    }

    fn rebuild_pool(&mut self) -> GeneratorResult<()> {
        let traveler = self.traveler.ok_or(GeneratorError::MissingTraveler)?;

        self.selector.clear();
        self.pickups.reset();
        self.breather_remaining = 0;
        self.warmup_remaining = self.settings.pool.safe_start_rings;

        let difficulty = self.clock.sample();
        for handle in self.pool.layout(traveler.z) {
            self.configure_ring(handle, &traveler, difficulty)?;
        }
        self.colors.apply(self.pool.rings_mut());
        Ok(())
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32) {
        if self.status != GeneratorStatus::Running {
            return;
        }
        let Some(traveler) = self.traveler else {
            self.disable(&GeneratorError::MissingTraveler);
            return;
        };

        self.now += dt;
        self.clock.advance(dt);
        let difficulty = self.clock.sample();

        self.finish_dissolves();

        for handle in self.pool.due_for_recycle(traveler.z) {
            if let Err(err) = self.recycle(handle, &traveler, difficulty) {
                self.disable(&err);
                return;
            }
        }

        for ring in self.pool.rings_mut() {
            ring.tick_content(dt, difficulty.t01);
        }

        self.colors.advance(dt);
        self.colors.apply(self.pool.rings_mut());
    }

    fn finish_dissolves(&mut self) {
        let now = self.now;
        for ring in self.pool.rings_mut() {
            if ring.finish_dissolve(now) {
                log::debug!("Ring {} finished dissolving at z={}", ring.handle.0, ring.z());
            }
        }
    }

    fn recycle(
        &mut self,
        handle: RingHandle,
        traveler: &Traveler,
        difficulty: Difficulty,
    ) -> GeneratorResult<()> {
        let passed = self
            .pool
            .get(handle)
            .filter(|r| r.is_obstacle())
            .and_then(|r| r.archetype())
            .and_then(|i| self.catalog.get(i))
            .map(|a| a.name.clone());

        let Some(moved) = self.pool.advance(handle) else {
            return Ok(());
        };
        self.configure_ring(handle, traveler, difficulty)?;

        if moved.was_obstacle {
            self.events.push(TunnelEvent::RingPassed {
                ring: handle,
                archetype: passed.unwrap_or_default(),
            });
        }
        Ok(())
    }

    fn next_ring_is_obstacle(&mut self) -> bool {
        if self.catalog.is_empty() {
            return false;
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return false;
        }
        if self.selector.run_active() {
            return true;
        }
        if self.breather_remaining > 0 {
            self.breather_remaining -= 1;
            return false;
        }
        true
    }

    fn configure_ring(
        &mut self,
        handle: RingHandle,
        traveler: &Traveler,
        difficulty: Difficulty,
    ) -> GeneratorResult<()> {
        if self.next_ring_is_obstacle() {
            self.configure_obstacle_ring(handle, traveler, difficulty)
        } else {
            self.configure_plain_ring(handle, traveler);
            Ok(())
        }
    }

    fn configure_obstacle_ring(
        &mut self,
        handle: RingHandle,
        traveler: &Traveler,
        difficulty: Difficulty,
    ) -> GeneratorResult<()> {
        let side_count = self.side_count;
        let picked = self
            .selector
            .ensure_run_state(&self.catalog, difficulty.level, side_count, &mut self.rng)
            .map(|(run, fresh)| (run.archetype, fresh, run.length, run.level));
        let Some((archetype_index, fresh, length, level)) = picked else {
            self.configure_plain_ring(handle, traveler);
            return Ok(());
        };

        let descriptor = &self.catalog.archetypes[archetype_index];
        if fresh {
            self.events.push(TunnelEvent::RunStarted {
                archetype: descriptor.name.clone(),
                length,
                level,
            });
        }
        let template = self.library.get(&descriptor.template).ok_or_else(|| {
            GeneratorError::MissingTemplate {
                archetype: descriptor.name.clone(),
                template: descriptor.template.clone(),
            }
        })?;

        let rotation = self.selector.current_rotation(side_count);
        let Some(ring) = self.pool.get_mut(handle) else {
            return Ok(());
        };

        let slot = ring.content_mut();
        let reusable = slot.as_ref().is_some_and(|c| c.template == template.id);
        if !reusable {
            if let Some(old) = slot.as_ref() {
                log::debug!(
                    "Ring {} swaps '{}' content for '{}'",
                    handle.0,
                    old.template,
                    template.id
                );
            }
            *slot = Some(ObstacleContent::instantiate(template, &descriptor.name));
        }
        if let Some(content) = slot.as_mut() {
            content.configure(&descriptor.name, rotation, traveler.tube_radius);
        }
        ring.mark_obstacle(archetype_index);

        self.selector.consume_ring();
        self.selector.advance_rotation(side_count, &mut self.rng);
        if !self.selector.run_active() {
            let pool = &self.settings.pool;
            self.breather_remaining = self
                .rng
                .range_inclusive(pool.breather_min, pool.breather_max);
        }

        if let Some(kind) =
            self.pickups
                .populate_obstacle_ring(ring, traveler.tube_radius, &mut self.rng)
        {
            self.events.push(TunnelEvent::PickupSpawned { ring: handle, kind });
        }
        Ok(())
    }

    fn configure_plain_ring(&mut self, handle: RingHandle, traveler: &Traveler) {
        let Some(ring) = self.pool.get_mut(handle) else {
            return;
        };
        ring.mark_plain();
        let spawned = self.pickups.populate_pickup_ring(
            ring,
            traveler.tube_radius,
            &self.powerups,
            &mut self.rng,
        );
        self.events.extend(
            spawned
                .into_iter()
                .map(|kind| TunnelEvent::PickupSpawned { ring: handle, kind }),
        );
    }

    /// Fade out the `count` nearest rings ahead of the traveler.
    ///
    /// Dissolving rings keep their pickups and are skipped by the recycler
    /// until `duration` seconds have passed; then they become plain rings.
    pub fn dissolve_next_rings(&mut self, count: usize, duration: f32) -> Vec<RingHandle> {
        let Some(traveler) = self.traveler else {
            return Vec::new();
        };
        let handles = self.pool.nearest_ahead(traveler.z, count);
        let now = self.now;
        for &handle in &handles {
            if let Some(ring) = self.pool.get_mut(handle) {
                ring.begin_dissolve(now, duration);
            }
        }
        log::debug!("Dissolving {} rings over {}s", handles.len(), duration);
        handles
    }

    pub fn set_pickup_chance_multiplier(&mut self, multiplier: f32) {
        self.pickups.set_chance_multiplier(multiplier);
    }

    pub fn set_pickup_float_height(&mut self, height: f32) {
        self.pickups.set_float_height(height);
    }

    pub fn set_gradient(&mut self, gradient: Box<dyn Gradient>) {
        self.colors.set_gradient(gradient);
    }

    pub fn set_accent_gradient(&mut self, gradient: Option<Box<dyn Gradient>>) {
        self.colors.set_accent_gradient(gradient);
    }

    pub fn set_darken_factor(&mut self, darken_factor: f32) {
        self.colors.set_darken_factor(darken_factor);
    }

    pub fn set_cycle_speed(&mut self, cycle_speed: f32) {
        self.colors.set_cycle_speed(cycle_speed);
    }

    pub fn set_difficulty_enabled(&mut self, enabled: bool) {
        self.clock.set_enabled(enabled);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TunnelEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn status(&self) -> GeneratorStatus {
        self.status
    }

    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    pub fn rings(&self) -> &[Ring] {
        self.pool.rings()
    }

    pub fn ring(&self, handle: RingHandle) -> Option<&Ring> {
        self.pool.get(handle)
    }

    /// Handles ordered nearest-first by position
    pub fn ordered_rings(&self) -> Vec<RingHandle> {
        self.pool.ordered()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn side_count(&self) -> u32 {
        self.side_count
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn difficulty(&self) -> Difficulty {
        self.clock.sample()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn palette(&self) -> RingPalette {
        self.colors.palette()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let run = self.selector.run().filter(|r| !r.is_exhausted());
        DebugSnapshot {
            status: self.status,
            seed: self.rng.seed(),
            difficulty: self.clock.sample(),
            side_count: self.side_count,
            archetype: run
                .and_then(|r| self.catalog.get(r.archetype))
                .map(|a| a.name.clone()),
            run_length: run.map(|r| r.length).unwrap_or(0),
            run_remaining: run.map(|r| r.remaining).unwrap_or(0),
            rotation_slot: run.map(|r| r.slot),
            last_step: run.map(|r| r.last_step).unwrap_or(0),
            last_direction: run.map(|r| r.last_direction).unwrap_or(0),
            chain: self.pickups.chain(),
            breather_remaining: self.breather_remaining,
            furthest_z: self.pool.furthest_z(),
            dissolving: self.pool.rings().iter().filter(|r| r.is_dissolving()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::ArchetypeDescriptor;

    fn settings(safe_start: u32, breather: u32) -> Settings {
        let mut settings = Settings::default();
        settings.pool.safe_start_rings = safe_start;
        settings.pool.breather_min = breather;
        settings.pool.breather_max = breather;
        settings
    }

    fn running(settings: Settings, catalog: Catalog) -> TunnelGenerator {
        let mut generator = TunnelGenerator::new(
            settings,
            catalog,
            ContentLibrary::standard(),
            PowerupTable::standard(),
            Box::new(LinearGradient::neon()),
        );
        generator.attach_traveler(Traveler::new(0.0, 6.0));
        generator.start(3).unwrap();
        generator
    }

    fn obstacle_pattern(generator: &TunnelGenerator) -> Vec<bool> {
        generator
            .ordered_rings()
            .iter()
            .map(|h| generator.ring(*h).unwrap().is_obstacle())
            .collect()
    }

    #[test]
    fn test_breather_separates_runs() {
        let catalog = Catalog::new(vec![
            ArchetypeDescriptor::new("wedge", "wedge", 1.0).with_run(2, 2, 0),
        ]);
        let generator = running(settings(0, 2), catalog);
        assert_eq!(
            obstacle_pattern(&generator),
            vec![true, true, false, false, true, true, false, false, true, true]
        );
    }

    #[test]
    fn test_warmup_then_obstacles() {
        let catalog = Catalog::new(vec![
            ArchetypeDescriptor::new("wedge", "wedge", 1.0).with_run(10, 10, 0),
        ]);
        let generator = running(settings(4, 0), catalog);
        assert_eq!(
            obstacle_pattern(&generator),
            vec![false, false, false, false, true, true, true, true, true, true]
        );
    }

    #[test]
    fn test_update_before_start_is_noop() {
        let mut generator = TunnelGenerator::with_defaults(Settings::default());
        generator.attach_traveler(Traveler::new(500.0, 6.0));
        generator.update(1.0);
        assert_eq!(generator.status(), GeneratorStatus::Idle);
        assert_eq!(generator.now(), 0.0);
        assert!(generator.drain_events().is_empty());
    }

    #[test]
    fn test_rebuild_while_idle_stores_side_count() {
        let mut generator = TunnelGenerator::with_defaults(Settings::default());
        generator.rebuild(5).unwrap();
        assert_eq!(generator.side_count(), 5);
        assert!(generator.drain_events().is_empty());
    }

    #[test]
    fn test_dissolve_completion_leaves_plain_rings() {
        let catalog = Catalog::new(vec![
            ArchetypeDescriptor::new("fan", "fan", 1.0).with_run(10, 10, 0),
        ]);
        let mut generator = running(settings(0, 0), catalog);
        let handles = generator.dissolve_next_rings(3, 0.1);
        assert_eq!(handles.len(), 3);
        assert_eq!(generator.debug_snapshot().dissolving, 3);

        generator.update(0.2);
        for handle in handles {
            let ring = generator.ring(handle).unwrap();
            assert!(!ring.is_dissolving());
            assert!(!ring.is_obstacle());
            assert!(ring.active_content().is_none());
        }
    }

    #[test]
    fn test_frozen_difficulty() {
        let mut generator = running(Settings::default(), Catalog::standard());
        generator.set_difficulty_enabled(false);
        for _ in 0..180 {
            generator.update(1.0);
        }
        assert_eq!(generator.difficulty(), Difficulty::default());
    }

    #[test]
    fn test_debug_snapshot() {
        let generator = running(settings(0, 1), Catalog::standard());
        let snapshot = generator.debug_snapshot();
        assert_eq!(snapshot.status, GeneratorStatus::Running);
        assert_eq!(snapshot.seed, 3);
        assert_eq!(snapshot.side_count, 6);
        assert_eq!(snapshot.furthest_z, 180.0);
        assert!(!(snapshot.chain.in_chain() && snapshot.chain.in_gap()));
        if let Some(slot) = snapshot.rotation_slot {
            assert!(slot < 6);
        }
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"status\":\"Running\""));
    }
}
