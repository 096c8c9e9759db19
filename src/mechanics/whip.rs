//! Whip: a sweeping annular-sector window.
//!
//! The window slides across `arcDeg` once every `drawDuration` seconds and
//! loops. In poll mode overlap is tested geometrically every `pollInterval`;
//! in collider mode the payload's own sensor is reshaped to the window each
//! frame and hits come from its overlaps.

use bevy::prelude::*;
use bevy_rapier2d::prelude::Collider;
use std::collections::HashMap;

use super::common::{direction_setting, normal_between, HitEmitter, HitRules};
use super::contract::{Mechanic, MechanicContext};
use super::geometry::{heading, AnnularSector};
use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::Lifecycle;
use crate::hits::Overlaps;
use crate::rendering::SectorVisual;
use crate::settings::{normalize, SettingsMap};

const COLLIDER_SEGMENTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhipHitMode {
    Poll,
    #[default]
    Collider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhipVisualMode {
    #[default]
    Edge,
    Filled,
}

#[derive(Component, Debug, Clone)]
pub struct WhipMechanic {
    pub rules: HitRules,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub arc_deg: f32,
    pub window_deg: f32,
    pub draw_duration: f32,
    pub hit_mode: WhipHitMode,
    pub poll_interval: f32,
    pub rehit_cooldown: f32,
    pub visual_mode: WhipVisualMode,
    pub color: Color,
    pub direction: Vec2,
    pub elapsed: f32,
    poll_timer: f32,
    last_hit: HashMap<Entity, f32>,
    lifecycle: Lifecycle,
}

impl Default for WhipMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(15.0),
            inner_radius: 0.5,
            outer_radius: 3.0,
            arc_deg: 120.0,
            window_deg: 30.0,
            draw_duration: 0.6,
            hit_mode: WhipHitMode::Collider,
            poll_interval: 0.1,
            rehit_cooldown: 0.4,
            visual_mode: WhipVisualMode::Edge,
            color: Color::srgb(0.9, 0.75, 0.5),
            direction: Vec2::X,
            elapsed: 0.0,
            poll_timer: 0.0,
            last_hit: HashMap::new(),
            lifecycle: Lifecycle::default(),
        }
    }
}

impl WhipMechanic {
    /// Window start/end in radians (relative to world X) at the current time.
    pub fn window(&self) -> (f32, f32) {
        let progress = if self.draw_duration > 0.0 {
            (self.elapsed % self.draw_duration) / self.draw_duration
        } else {
            0.0
        };
        let arc = self.arc_deg.to_radians();
        let width = self.window_deg.to_radians().min(arc.max(f32::EPSILON));
        let travel = (arc - width).max(0.0);
        let start = heading(self.direction) - arc * 0.5 + travel * progress;
        (start, start + width)
    }

    pub fn sector(&self, center: Vec2) -> AnnularSector {
        let (start, end) = self.window();
        AnnularSector {
            center,
            inner: self.inner_radius,
            outer: self.outer_radius,
            start,
            end,
        }
    }

    /// Cooldown check; records the hit when allowed.
    fn try_hit(&mut self, target: Entity) -> bool {
        let now = self.elapsed;
        match self.last_hit.get(&target) {
            Some(last) if now - last < self.rehit_cooldown => false,
            _ => {
                self.last_hit.insert(target, now);
                true
            }
        }
    }
}

impl Mechanic for WhipMechanic {
    const NAME: &'static str = "Whip";
    const ALIASES: &'static [&'static str] = &["WhipMechanic"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.inner_radius = normalize::radius(s, &["innerRadius"], self.inner_radius);
        self.outer_radius = normalize::radius(s, &["outerRadius", "radius", "length"], self.outer_radius);
        self.arc_deg = normalize::float(s, &["arcDeg", "arc"], self.arc_deg).clamp(0.0, 360.0);
        self.window_deg = normalize::float(s, &["windowDeg", "widthDeg"], self.window_deg).clamp(0.0, 360.0);
        self.draw_duration = normalize::interval(s, &["drawDuration", "duration"], self.draw_duration);
        self.poll_interval = normalize::interval(s, &["pollInterval"], self.poll_interval);
        self.rehit_cooldown = normalize::float(s, &["rehitCooldown", "hitCooldown"], self.rehit_cooldown).max(0.0);
        self.color = normalize::color(s, &["spriteColor", "color"], self.color);
        self.direction = direction_setting(settings, self.direction);

        let hit_mode = normalize::string(s, &["hitMode"], "");
        match hit_mode.to_ascii_lowercase().as_str() {
            "poll" | "overlap" => self.hit_mode = WhipHitMode::Poll,
            "collider" | "polygon" => self.hit_mode = WhipHitMode::Collider,
            _ => {}
        }
        let visual = normalize::string(s, &["visualMode", "visualization"], "");
        match visual.to_ascii_lowercase().as_str() {
            "filled" | "fill" => self.visual_mode = WhipVisualMode::Filled,
            "edge" | "outline" => self.visual_mode = WhipVisualMode::Edge,
            _ => {}
        }
        if self.inner_radius > self.outer_radius {
            std::mem::swap(&mut self.inner_radius, &mut self.outer_radius);
        }
    }

    fn reset_for_reuse(&mut self) {
        self.elapsed = 0.0;
        self.poll_timer = 0.0;
        self.last_hit.clear();
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// `sector` relative to an entity at its center facing `world_angle` radians.
pub fn local_sector(sector: &AnnularSector, world_angle: f32) -> AnnularSector {
    AnnularSector {
        center: Vec2::ZERO,
        start: sector.start - world_angle,
        end: sector.end - world_angle,
        ..*sector
    }
}

/// Sector polygon as a compound of convex quads, in the local space of an
/// entity facing `world_angle` radians.
pub fn sector_collider(sector: &AnnularSector, world_angle: f32) -> Option<Collider> {
    let local = local_sector(sector, world_angle);
    let parts: Vec<(Vec2, f32, Collider)> = local
        .quads(COLLIDER_SEGMENTS)
        .into_iter()
        .filter_map(|quad| Collider::convex_polyline(quad.to_vec()))
        .map(|collider| (Vec2::ZERO, 0.0, collider))
        .collect();
    (!parts.is_empty()).then(|| Collider::compound(parts))
}

#[allow(clippy::too_many_arguments)]
pub fn tick_whips(
    mut commands: Commands,
    time: Res<Time>,
    mut whips: Query<(Entity, &mut WhipMechanic, &MechanicContext, &GlobalTransform, Option<&Overlaps>)>,
    positions: Query<&GlobalTransform>,
    targeting: MobTargeting,
    targets: DamageTargets,
    mut emitter: HitEmitter,
) {
    let dt = time.delta_secs();
    for (entity, mut whip, ctx, transform, overlaps) in whips.iter_mut() {
        if !whip.lifecycle.is_running() {
            continue;
        }
        whip.elapsed += dt;
        let cooldown = whip.rehit_cooldown;
        let now = whip.elapsed;
        whip.last_hit.retain(|_, last| now - *last < cooldown);

        let center = transform.translation().truncate();
        let sector = whip.sector(center);
        let filter = whip.rules.filter(ctx.owner);

        commands.entity(entity).insert(SectorVisual {
            inner: sector.inner,
            outer: sector.outer,
            start: sector.start,
            end: sector.end,
            filled: whip.visual_mode == WhipVisualMode::Filled,
            color: whip.color,
            visible: true,
        });

        let candidates: Vec<Entity> = match whip.hit_mode {
            WhipHitMode::Poll => {
                whip.poll_timer += dt;
                if whip.poll_timer < whip.poll_interval {
                    continue;
                }
                whip.poll_timer = 0.0;
                targeting
                    .mobs_within(center, sector.outer)
                    .into_iter()
                    .filter(|(_, position)| sector.contains(*position))
                    .map(|(mob, _)| mob)
                    .collect()
            }
            WhipHitMode::Collider => {
                let facing = heading(transform.right().truncate());
                if let Some(collider) = sector_collider(&sector, facing) {
                    commands.entity(entity).insert(collider);
                }
                overlaps.map(Overlaps::sorted).unwrap_or_default()
            }
        };

        for other in candidates {
            let Some(target) = targets.accept(other, &filter) else {
                continue;
            };
            if !whip.try_hit(target) {
                continue;
            }
            let position = positions
                .get(target)
                .map(|t| t.translation().truncate())
                .unwrap_or(center);
            let normal = normal_between(position, center, whip.direction);
            emitter.hit(entity, target, whip.rules.damage, position, normal);
        }
    }
}
