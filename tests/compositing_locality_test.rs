//! Compositing locality and blending fixtures
//!
//! The critical invariant: recompositing any sub-rectangle produces
//! pixel-identical results to a full recompute restricted to that
//! rectangle, for arbitrary layer stacks. Checked here over randomized
//! stacks and rects with a deterministic xorshift generator.

use inkboard::{BlendMode, Compositor, DirtyRect, LayerStack, Rgba};

/// Deterministic xorshift64* so failures reproduce exactly.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Rng(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, bound: u32) -> u32 {
        (self.next() % bound as u64) as u32
    }
}

const SIZE: u32 = 24;

fn random_stack(rng: &mut Rng) -> LayerStack {
    let mut stack = LayerStack::new(SIZE, SIZE);
    let layer_count = 1 + rng.below(3);
    for _ in 0..layer_count {
        let id = stack.push_layer().unwrap();
        let layer = stack.layer_mut(id).unwrap();
        for y in 0..SIZE {
            for x in 0..SIZE {
                let px = [
                    rng.below(256) as u8,
                    rng.below(256) as u8,
                    rng.below(256) as u8,
                    rng.below(256) as u8,
                ];
                layer.buffer.set_pixel(x, y, px);
            }
        }
        layer.opacity = rng.below(101) as f32 / 100.0;
        layer.visible = rng.below(8) != 0;
        layer.blend_mode = match rng.below(6) {
            0 => BlendMode::Normal,
            1 => BlendMode::Multiply,
            2 => BlendMode::Add,
            3 => BlendMode::Screen,
            4 => BlendMode::Overlay,
            _ => BlendMode::Erase,
        };
    }
    stack
}

fn random_rect(rng: &mut Rng) -> DirtyRect {
    let x0 = rng.below(SIZE) as i32;
    let y0 = rng.below(SIZE) as i32;
    let x1 = x0 + 1 + rng.below(SIZE) as i32;
    let y1 = y0 + 1 + rng.below(SIZE) as i32;
    DirtyRect::new(x0, y0, x1, y1)
}

#[test]
fn dirty_rect_composition_matches_full_recompute() {
    let mut rng = Rng::new(0x1A2B_3C4D);
    for round in 0..40 {
        let stack = random_stack(&mut rng);
        let rect = random_rect(&mut rng);

        let mut full = Compositor::new(SIZE, SIZE).unwrap();
        full.composite(&stack, None).unwrap();

        // The partial compositor starts from a transparent output: only the
        // pixels inside the rect may change, and they must match the full
        // recompute exactly.
        let mut partial = Compositor::new(SIZE, SIZE).unwrap();
        partial.composite(&stack, Some(rect)).unwrap();

        let clamped = rect.clamped_to(SIZE, SIZE);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let inside = clamped.contains(x as i32, y as i32);
                let got = partial.output().pixel(x, y);
                if inside {
                    let want = full.output().pixel(x, y);
                    assert_eq!(got, want, "round {round}: pixel ({x},{y}) inside {clamped:?}");
                } else {
                    assert_eq!(got, [0, 0, 0, 0], "round {round}: pixel ({x},{y}) outside {clamped:?}");
                }
            }
        }
    }
}

#[test]
fn repeated_recompositions_are_idempotent() {
    let mut rng = Rng::new(0xD00D);
    let stack = random_stack(&mut rng);
    let mut compositor = Compositor::new(SIZE, SIZE).unwrap();
    compositor.composite(&stack, None).unwrap();
    let first = compositor.output().clone();
    compositor.composite(&stack, None).unwrap();
    compositor
        .composite(&stack, Some(DirtyRect::new(3, 3, 17, 19)))
        .unwrap();
    assert_eq!(compositor.output(), &first);
}

#[test]
fn opaque_layer_over_empty_canvas_is_identity() {
    let mut rng = Rng::new(7);
    let mut stack = LayerStack::new(SIZE, SIZE);
    let id = stack.push_layer().unwrap();
    {
        let layer = stack.layer_mut(id).unwrap();
        for y in 0..SIZE {
            for x in 0..SIZE {
                let px = [
                    rng.below(256) as u8,
                    rng.below(256) as u8,
                    rng.below(256) as u8,
                    255,
                ];
                layer.buffer.set_pixel(x, y, px);
            }
        }
    }

    let mut compositor = Compositor::new(SIZE, SIZE).unwrap();
    compositor.composite(&stack, None).unwrap();
    assert_eq!(
        compositor.output().as_bytes(),
        stack.layer(id).unwrap().buffer.as_bytes()
    );
}

#[test]
fn red_under_half_blue_fixture() {
    let mut stack = LayerStack::new(4, 4);
    let bottom = stack.push_layer().unwrap();
    let top = stack.push_layer().unwrap();
    stack.layer_mut(bottom).unwrap().fill(Rgba::RED);
    stack.layer_mut(top).unwrap().fill(Rgba::from_rgba8(0, 0, 255, 128));

    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    let px = out.pixel(1, 1);
    assert!((px[0] as i32 - 128).abs() <= 1, "r = {}", px[0]);
    assert_eq!(px[1], 0);
    assert!((px[2] as i32 - 128).abs() <= 1, "b = {}", px[2]);
    assert_eq!(px[3], 255);
}
