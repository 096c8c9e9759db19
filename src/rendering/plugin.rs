//! Rendering plugin - realizes visual descriptions for windowed apps.
//!
//! Builders and mechanics only ever insert `VisualSpec`, `SectorVisual` and
//! `RingVisual`. This plugin turns them into 2D meshes, sprites and gizmo
//! overlays. Headless apps leave it out and nothing is drawn.

use bevy::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

use super::visual_config::VisualConfig;
use super::visuals::{RingVisual, SectorVisual, VisualShape, VisualSpec};
use crate::combat::{Dead, HitFlash};
use crate::core::DamageEvent;
use crate::mechanics::{BeamMechanic, Mechanic};

const DAMAGE_FLASH_SECONDS: f32 = 0.1;

/// Rendering plugin - 2D visuals and debug overlays.
#[derive(Default)]
pub struct RenderingPlugin {
    /// Directory holding `rendering.ron`; defaults are used without it.
    pub data_dir: Option<PathBuf>,
}

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.data_dir {
            Some(dir) => VisualConfig::load(&dir.join("rendering.ron")),
            None => VisualConfig::default(),
        };
        app.insert_resource(ClearColor(config.clear_color()))
            .insert_resource(config)
            .init_resource::<VisualMeshes>()
            .add_systems(
                PostUpdate,
                (
                    realize_visuals,
                    flash_on_damage,
                    tint_hit_flashes,
                    draw_sector_visuals,
                    draw_ring_visuals,
                    draw_beams,
                ),
            );
    }
}

/// Mesh cache keyed by shape and size.
#[derive(Resource, Default)]
pub struct VisualMeshes {
    meshes: HashMap<(VisualShape, u32), Handle<Mesh>>,
}

impl VisualMeshes {
    fn get_or_add(&mut self, shape: VisualShape, size: f32, meshes: &mut Assets<Mesh>) -> Handle<Mesh> {
        self.meshes
            .entry((shape, size.to_bits()))
            .or_insert_with(|| match shape {
                VisualShape::Square => meshes.add(Rectangle::new(size, size)),
                _ => meshes.add(Circle::new(size * 0.5)),
            })
            .clone()
    }
}

/// Every entity gets its own material so flashes can tint it alone.
fn realize_visuals(
    mut commands: Commands,
    specs: Query<(Entity, &VisualSpec), Changed<VisualSpec>>,
    mut cache: ResMut<VisualMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    asset_server: Res<AssetServer>,
) {
    for (entity, spec) in specs.iter() {
        let mut entity = commands.entity(entity);
        match (spec.shape, &spec.resource) {
            (VisualShape::Custom, Some(path)) => {
                entity.insert(Sprite {
                    image: asset_server.load(path.clone()),
                    color: spec.color,
                    custom_size: Some(Vec2::splat(spec.size)),
                    ..default()
                });
            }
            (shape, _) => {
                let mesh = cache.get_or_add(shape, spec.size, &mut meshes);
                entity.insert((Mesh2d(mesh), MeshMaterial2d(materials.add(spec.color))));
            }
        }
    }
}

/// Short white-out on anything visible that takes damage.
fn flash_on_damage(
    mut commands: Commands,
    mut damage: EventReader<DamageEvent>,
    visible: Query<(), (With<VisualSpec>, Without<HitFlash>, Without<Dead>)>,
    config: Res<VisualConfig>,
) {
    for event in damage.read() {
        if visible.contains(event.target) {
            commands
                .entity(event.target)
                .insert(HitFlash::new(DAMAGE_FLASH_SECONDS, config.hit_flash_color()));
        }
    }
}

fn tint_hit_flashes(
    flashing: Query<(&HitFlash, &MeshMaterial2d<ColorMaterial>)>,
    mut restored: RemovedComponents<HitFlash>,
    specs: Query<(&VisualSpec, &MeshMaterial2d<ColorMaterial>)>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (flash, handle) in flashing.iter() {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.color = flash.color;
        }
    }
    for entity in restored.read() {
        let Ok((spec, handle)) = specs.get(entity) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            material.color = spec.color;
        }
    }
}

/// Points along an arc from `start` to `end` (radians, counter-clockwise).
pub fn arc_points(center: Vec2, radius: f32, start: f32, end: f32, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(1);
    let step = (end - start) / segments as f32;
    (0..=segments)
        .map(|i| center + Vec2::from_angle(start + step * i as f32) * radius)
        .collect()
}

fn draw_sector_visuals(mut gizmos: Gizmos, sectors: Query<(&SectorVisual, &GlobalTransform)>, config: Res<VisualConfig>) {
    for (sector, transform) in sectors.iter() {
        if !sector.visible {
            continue;
        }
        let center = transform.translation().truncate();
        let mut outline = arc_points(center, sector.outer, sector.start, sector.end, config.arc_resolution);
        let mut inner = arc_points(center, sector.inner, sector.start, sector.end, config.arc_resolution);
        if sector.filled {
            for (a, b) in inner.iter().zip(outline.iter()) {
                gizmos.line_2d(*a, *b, sector.color);
            }
        }
        inner.reverse();
        outline.extend(inner);
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        gizmos.linestrip_2d(outline, sector.color);
    }
}

fn draw_ring_visuals(mut gizmos: Gizmos, rings: Query<(&RingVisual, &GlobalTransform)>, config: Res<VisualConfig>) {
    let full = std::f32::consts::TAU;
    for (ring, transform) in rings.iter() {
        if !ring.visible {
            continue;
        }
        let center = transform.translation().truncate();
        let half = ring.thickness * 0.5;
        for radius in [ring.radius - half, ring.radius + half] {
            if radius > 0.0 {
                gizmos.linestrip_2d(arc_points(center, radius, 0.0, full, config.arc_resolution * 2), ring.color);
            }
        }
    }
}

fn draw_beams(mut gizmos: Gizmos, beams: Query<(&BeamMechanic, &GlobalTransform)>, config: Res<VisualConfig>) {
    for (beam, transform) in beams.iter() {
        if !beam.lifecycle().is_running() {
            continue;
        }
        let origin = transform.translation().truncate();
        let along = beam.direction * beam.length;
        let across = beam.direction.perp() * beam.width * 0.5;
        gizmos.linestrip_2d(
            [
                origin + across,
                origin + along + across,
                origin + along - across,
                origin - across,
                origin + across,
            ],
            config.beam_color(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn arc_points_span_the_window() {
        let points = arc_points(Vec2::ZERO, 2.0, 0.0, PI, 4);
        assert_eq!(points.len(), 5);
        assert!(points[0].abs_diff_eq(Vec2::new(2.0, 0.0), 1e-5));
        assert!(points[4].abs_diff_eq(Vec2::new(-2.0, 0.0), 1e-4));
    }
}
