//! Parallax background
//!
//! Decoration only: consumes game speed, never interacts with gameplay.
//! Five layers scroll at increasing parallax factors, with drifting clouds
//! and a fixed starfield on top of the sky gradient.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::geom::Rect;
use crate::render::{Color, DrawTarget};

/// Parallax factors, back to front
const LAYER_SPEEDS: [f32; 5] = [0.1, 0.3, 0.5, 1.0, 1.2];
const MAX_CLOUDS: usize = 5;
const CLOUD_SPAWN_INTERVAL: f32 = 4.0;
const STAR_COUNT: usize = 50;

#[derive(Debug, Clone, Copy)]
struct Cloud {
    pos: Vec2,
    size: f32,
    drift: f32,
}

#[derive(Debug)]
pub struct Background {
    /// Horizontal scroll offset per layer, wrapped at the viewport width
    offsets: [f32; 5],
    clouds: Vec<Cloud>,
    cloud_clock: f32,
    stars: Vec<(Vec2, f32)>,
}

impl Background {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| {
                (
                    Vec2::new(
                        rng.random_range(0.0..VIEW_WIDTH),
                        rng.random_range(0.0..VIEW_HEIGHT * 0.5),
                    ),
                    rng.random_range(0.5..2.0),
                )
            })
            .collect();
        let mut bg = Self {
            offsets: [0.0; 5],
            clouds: Vec::new(),
            cloud_clock: 0.0,
            stars,
        };
        for _ in 0..3 {
            bg.spawn_cloud(rng, true);
        }
        bg
    }

    fn spawn_cloud<R: Rng + ?Sized>(&mut self, rng: &mut R, anywhere: bool) {
        if self.clouds.len() >= MAX_CLOUDS {
            return;
        }
        let x = if anywhere {
            rng.random_range(0.0..VIEW_WIDTH)
        } else {
            VIEW_WIDTH + 60.0
        };
        self.clouds.push(Cloud {
            pos: Vec2::new(x, rng.random_range(40.0..200.0)),
            size: rng.random_range(20.0..45.0),
            drift: rng.random_range(0.2..0.5),
        });
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, game_speed: f32, rng: &mut R) {
        for (offset, factor) in self.offsets.iter_mut().zip(LAYER_SPEEDS) {
            *offset = (*offset + game_speed * factor * PX_PER_SPEED * dt) % VIEW_WIDTH;
        }

        for cloud in self.clouds.iter_mut() {
            cloud.pos.x -= game_speed * cloud.drift * PX_PER_SPEED * dt;
        }
        self.clouds.retain(|c| c.pos.x + c.size > -OFFSCREEN_MARGIN);

        self.cloud_clock += dt;
        if self.cloud_clock >= CLOUD_SPAWN_INTERVAL {
            self.cloud_clock = 0.0;
            self.spawn_cloud(rng, false);
        }
    }

    pub fn reset(&mut self) {
        self.offsets = [0.0; 5];
        self.cloud_clock = 0.0;
    }

    pub fn draw(&self, target: &mut dyn DrawTarget) {
        // Night sky
        target.fill_rect(
            Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
            Color::rgb(0x1a, 0x1a, 0x2e),
        );
        for &(pos, size) in &self.stars {
            target.fill_circle(pos, size, Color::WHITE.with_alpha(0.3));
        }

        // Mountain silhouettes, two parallax depths
        for (layer, color, base_height) in [
            (1usize, Color::rgb(0x1e, 0x1e, 0x3c), 180.0f32),
            (2, Color::rgb(0x28, 0x28, 0x50), 120.0),
        ] {
            let offset = self.offsets[layer];
            for i in 0..5 {
                let peak_x = (i as f32 * VIEW_WIDTH / 4.0 - offset).rem_euclid(VIEW_WIDTH + 200.0)
                    - 100.0;
                let height = base_height * (0.6 + 0.4 * ((i * 37) % 10) as f32 / 10.0);
                target.fill_triangle(
                    Vec2::new(peak_x - 120.0, GROUND_Y),
                    Vec2::new(peak_x, GROUND_Y - height),
                    Vec2::new(peak_x + 120.0, GROUND_Y),
                    color,
                );
            }
        }

        for cloud in &self.clouds {
            target.fill_circle(cloud.pos, cloud.size, Color::WHITE.with_alpha(0.15));
            target.fill_circle(
                cloud.pos + Vec2::new(cloud.size * 0.7, cloud.size * 0.2),
                cloud.size * 0.7,
                Color::WHITE.with_alpha(0.12),
            );
        }

        // Rooftop band and ground
        let roof_offset = self.offsets[3];
        for i in 0..6 {
            let x = (i as f32 * 160.0 - roof_offset).rem_euclid(VIEW_WIDTH + 160.0) - 80.0;
            target.fill_rect(
                Rect::new(x, GROUND_Y - 60.0, 120.0, 60.0),
                Color::rgb(0x20, 0x16, 0x38).with_alpha(0.8),
            );
        }
        target.fill_rect(
            Rect::new(0.0, GROUND_Y, VIEW_WIDTH, GROUND_OFFSET),
            Color::rgb(0x2d, 0x1b, 0x4e),
        );
        // Ground lip
        target.fill_rect(
            Rect::new(0.0, GROUND_Y, VIEW_WIDTH, 4.0),
            Color::WHITE.with_alpha(0.1),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingTarget;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_offsets_stay_wrapped() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut bg = Background::new(&mut rng);
        for _ in 0..10_000 {
            bg.update(1.0 / 60.0, MAX_GAME_SPEED, &mut rng);
        }
        for offset in bg.offsets {
            assert!((0.0..VIEW_WIDTH).contains(&offset));
        }
        assert!(bg.clouds.len() <= MAX_CLOUDS);
    }

    #[test]
    fn test_draw_emits_scene() {
        let mut rng = Pcg32::seed_from_u64(5);
        let bg = Background::new(&mut rng);
        let mut target = RecordingTarget::new();
        bg.draw(&mut target);
        assert!(target.shape_count() > STAR_COUNT);
    }
}
