//! Popperian Falsification Tests - Rasterizer Claims
//!
//! Each test is a falsifiable claim about observable rasterizer behavior,
//! exercised only through the public API.
//!
//! Run: cargo test --test raster_claims_test

#![allow(clippy::unwrap_used, clippy::needless_range_loop)]

use pixelcore::accel::{self, scalar};
use pixelcore::prelude::*;
use proptest::prelude::*;

/// Adds 1 to every channel per write: pixel values count writes.
fn counting_state() -> RenderState {
    RenderState::default()
        .with_color(Color::new(1, 1, 1, 255))
        .with_blend_mode(BlendMode::new(BlendFactor::One, BlendFactor::One, BlendOp::Add))
}

fn write_counts(img: &Image) -> Vec<u8> {
    img.pixels().iter().map(|c| c.r).collect()
}

// ============================================================================
// SECTION 1: COLOR ARITHMETIC CLAIMS
// ============================================================================

/// Claim 1: `+` and `-` saturate per channel instead of wrapping
#[test]
fn claim_01_color_add_sub_saturate() {
    let a = Color::new(200, 10, 255, 0);
    let b = Color::new(100, 20, 1, 0);
    assert_eq!(a + b, Color::new(255, 30, 255, 0), "Claim 1 FALSIFIED: add wrapped");
    assert_eq!(a - b, Color::new(100, 0, 254, 0), "Claim 1 FALSIFIED: sub wrapped");
}

/// Claim 2: Dispatched color operators agree with the scalar kernels for
/// every channel pair
#[test]
fn claim_02_dispatch_matches_scalar_for_all_pairs() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let x = Color::new(a, b, 255 - a, a / 2);
            let y = Color::new(b, a, a, 255 - b);
            assert_eq!(x + y, scalar::add(x, y), "Claim 2 FALSIFIED: add {x:?} {y:?}");
            assert_eq!(x - y, scalar::sub(x, y), "Claim 2 FALSIFIED: sub {x:?} {y:?}");
            assert_eq!(x * y, scalar::modulate(x, y), "Claim 2 FALSIFIED: mul {x:?} {y:?}");
            assert_eq!(x.min(y), scalar::min(x, y), "Claim 2 FALSIFIED: min {x:?} {y:?}");
            assert_eq!(x.max(y), scalar::max(x, y), "Claim 2 FALSIFIED: max {x:?} {y:?}");
        }
    }
    println!("color path: {:?}", accel::color_path());
}

/// Claim 3: HTML parsing accepts hex and functional forms and falls back
/// to opaque black
#[test]
fn claim_03_from_html() {
    assert_eq!(Color::from_html("#f00"), Color::new(255, 0, 0, 255));
    assert_eq!(Color::from_html("rgba(0,0,255,0)"), Color::new(0, 0, 255, 0));
    assert_eq!(Color::from_html("bogus"), Color::new(0, 0, 0, 255));
}

// ============================================================================
// SECTION 2: BLENDING CLAIMS
// ============================================================================

/// Claim 4: A disabled blend returns the source untouched
#[test]
fn claim_04_disable_blend_is_identity() {
    for src in [Color::TRANSPARENT, Color::RED, Color::new(1, 2, 3, 4)] {
        for dst in [Color::WHITE, Color::BLACK, Color::new(9, 8, 7, 6)] {
            assert_eq!(BlendMode::DISABLE.blend(src, dst), src, "Claim 4 FALSIFIED");
        }
    }
}

// ============================================================================
// SECTION 3: CLIPPING CLAIMS
// ============================================================================

/// Claim 5: A segment inside the box is accepted bit-exact
#[test]
fn claim_05_inside_segment_unchanged() {
    let aabb = Aabb::from_size(100, 100);
    let (mut a, mut b) = (Vec2::new(1.25, 2.5), Vec2::new(98.75, 97.125));
    assert!(aabb.clip(&mut a, &mut b), "Claim 5 FALSIFIED: rejected");
    assert_eq!(a, Vec2::new(1.25, 2.5), "Claim 5 FALSIFIED: p0 moved");
    assert_eq!(b, Vec2::new(98.75, 97.125), "Claim 5 FALSIFIED: p1 moved");
}

/// Claim 6: A segment with both endpoints in the same outside region is
/// rejected
#[test]
fn claim_06_shared_outside_region_rejected() {
    let aabb = Aabb::from_size(100, 100);
    let (mut a, mut b) = (Vec2::new(-5.0, 10.0), Vec2::new(-1.0, 90.0));
    assert!(!aabb.clip(&mut a, &mut b), "Claim 6 FALSIFIED: left region accepted");
    let (mut a, mut b) = (Vec2::new(120.0, 120.0), Vec2::new(150.0, 101.0));
    assert!(!aabb.clip(&mut a, &mut b), "Claim 6 FALSIFIED: bottom-right accepted");
}

// ============================================================================
// SECTION 4: RASTERIZATION CLAIMS
// ============================================================================

/// Claim 7: Two triangles tiling a square write each pixel exactly once
#[test]
fn claim_07_tiling_triangles_write_once() {
    let mut img = Image::new(16, 16);
    let state = counting_state();
    let (a, b, c, d) = (
        Vec2::new(2.0, 2.0),
        Vec2::new(12.0, 2.0),
        Vec2::new(12.0, 12.0),
        Vec2::new(2.0, 12.0),
    );
    draw_triangle(&mut img, &state, a, b, c);
    draw_triangle(&mut img, &state, a, c, d);

    for y in 0..16u32 {
        for x in 0..16u32 {
            let expected = u8::from((2..12).contains(&x) && (2..12).contains(&y));
            assert_eq!(
                img.get_pixel(x, y).unwrap().r,
                expected,
                "Claim 7 FALSIFIED at ({x}, {y})"
            );
        }
    }

    let mut quad = Image::new(16, 16);
    draw_quad(&mut quad, &state, &[a, b, c, d]);
    assert_eq!(write_counts(&quad), write_counts(&img), "Claim 7 FALSIFIED: quad differs");
}

/// Claim 8: Degenerate triangles and quads write nothing
#[test]
fn claim_08_degenerate_writes_nothing() {
    let mut img = Image::new(8, 8);
    let state = counting_state();
    let p = Vec2::new(3.0, 3.0);
    draw_triangle(&mut img, &state, p, p, Vec2::new(6.0, 6.0));
    draw_quad(&mut img, &state, &[p, p, p, p]);
    assert!(write_counts(&img).iter().all(|&n| n == 0), "Claim 8 FALSIFIED");
}

/// Claim 9: A white line along row 0 of a black 4x4 image touches only row 0
#[test]
fn claim_09_line_on_row_zero() {
    let mut img = Image::filled(4, 4, Color::BLACK);
    let state = RenderState::default()
        .with_color(Color::WHITE)
        .with_blend_mode(BlendMode::DISABLE);
    draw_line(&mut img, &state, Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0));

    for y in 0..4 {
        for x in 0..4 {
            let expected = if y == 0 { Color::WHITE } else { Color::BLACK };
            assert_eq!(img.get_pixel(x, y), Some(expected), "Claim 9 FALSIFIED at ({x}, {y})");
        }
    }
}

/// Claim 10: Wrap addressing on a 4-wide image maps x = 5 to x = 1
#[test]
fn claim_10_wrap_sample() {
    let mut img = Image::new(4, 4);
    for x in 0..4 {
        img.set_pixel(x, 0, Color::rgb(x as u8 * 50, 0, 0));
    }
    assert_eq!(
        img.sample(5, 0, AddressMode::Wrap),
        img.get_pixel(1, 0).unwrap(),
        "Claim 10 FALSIFIED"
    );
}

/// Claim 11: Back-face culling with counter-clockwise front rejects a
/// clockwise triangle
#[test]
fn claim_11_back_culling_rejects_clockwise() {
    let mut img = Image::new(10, 10);
    let state = counting_state()
        .with_cull_mode(CullMode::Back)
        .with_front_counter_clockwise(true);
    draw_triangle(
        &mut img,
        &state,
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 8.0),
        Vec2::new(8.0, 1.0),
    );
    assert!(write_counts(&img).iter().all(|&n| n == 0), "Claim 11 FALSIFIED");
}

/// Claim 12: Draw calls on an empty target are silent no-ops
#[test]
fn claim_12_empty_target_is_noop() {
    let mut img = Image::empty();
    let state = RenderState::default();
    draw_line(&mut img, &state, Vec2::ZERO, Vec2::new(5.0, 5.0));
    draw_circle(&mut img, &state, Vec2::ZERO, 3);
    draw_triangle(&mut img, &state, Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0));
    draw_image(&mut img, &state, &Image::filled(2, 2, Color::RED), Vec2::ZERO);
    assert!(img.is_empty(), "Claim 12 FALSIFIED");
}

// ============================================================================
// SECTION 5: INTERCHANGE CLAIMS
// ============================================================================

/// Claim 13: Pixels leave the image as R, G, B, A bytes
#[test]
fn claim_13_interchange_byte_order() {
    let mut img = Image::new(1, 1);
    img.set_pixel(0, 0, Color::new(0x11, 0x22, 0x33, 0x44));
    assert_eq!(img.to_rgba8(), vec![0x11, 0x22, 0x33, 0x44], "Claim 13 FALSIFIED");
    assert_eq!(Color::from_hex(0x1122_3344), Color::new(0x11, 0x22, 0x33, 0x44));
}

/// Claim 14: PNG save then load reproduces every pixel
#[test]
fn claim_14_png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claim_14.png");

    let mut img = Image::filled(5, 3, Color::BLACK);
    let state = RenderState::default().with_color(Color::from_html("hsl(120, 100%, 25%)"));
    draw_line(&mut img, &state, Vec2::new(0.0, 1.0), Vec2::new(4.0, 1.0));
    img.save(&path).unwrap();

    assert_eq!(Image::load(&path), img, "Claim 14 FALSIFIED");
}

// ============================================================================
// SECTION 6: EXTREME COORDINATE CLAIMS
// ============================================================================

const CANVAS: u32 = 32;
const FRAME: Viewport = Viewport::new(8, 8, 16, 16);

/// Coordinates from sub-pixel to near `f32::MAX`.
fn coord() -> impl Strategy<Value = f32> {
    prop_oneof![
        -40.0f32..72.0,
        -1e9f32..1e9,
        -3e38f32..3e38,
        Just(f32::MAX),
        Just(f32::MIN),
    ]
}

fn point() -> impl Strategy<Value = Vec2> {
    (coord(), coord()).prop_map(|(x, y)| Vec2::new(x, y))
}

fn rect() -> impl Strategy<Value = Rect> {
    (coord(), coord(), coord(), coord()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Draws inside `FRAME` only, with every pixel outside it left black.
fn assert_confined(img: &Image) {
    let inside = |v: u32| (8..24).contains(&v);
    for y in 0..CANVAS {
        for x in 0..CANVAS {
            if !(inside(x) && inside(y)) {
                assert_eq!(
                    img.get_pixel(x, y),
                    Some(Color::BLACK),
                    "Claim 15 FALSIFIED: write outside the viewport at ({x}, {y})"
                );
            }
        }
    }
}

fn canvas() -> (Image, RenderState) {
    let state = RenderState::default()
        .with_color(Color::WHITE)
        .with_blend_mode(BlendMode::DISABLE)
        .with_viewport(FRAME);
    (Image::filled(CANVAS, CANVAS, Color::BLACK), state)
}

proptest! {
    /// Claim 15: Lines, triangles and quads at any finite coordinates stay
    /// inside the viewport without panicking
    #[test]
    fn claim_15_vector_primitives_confined(
        a in point(),
        b in point(),
        c in point(),
        d in point(),
        wireframe in any::<bool>(),
    ) {
        let (mut img, state) = canvas();
        let state = if wireframe { state.with_fill_mode(FillMode::Wireframe) } else { state };
        let texture = Image::filled(2, 2, Color::RED);
        let verts = [a, b, c, d].map(|p| Vertex::new(p, Vec2::new(0.5, 0.5), Color::WHITE));

        draw_line(&mut img, &state, a, b);
        draw_triangle(&mut img, &state, a, b, c);
        draw_triangle_shaded(&mut img, &state, &[verts[0], verts[1], verts[2]]);
        draw_quad(&mut img, &state, &[a, b, c, d]);
        draw_quad_textured(&mut img, &state, &verts, &texture);
        assert_confined(&img);
    }

    /// Claim 16: Circles at any center and bounded radius stay inside the
    /// viewport without panicking
    #[test]
    fn claim_16_circles_confined(
        center in point(),
        radius in prop_oneof![0i32..64, 0i32..100_000],
        wireframe in any::<bool>(),
    ) {
        let (mut img, state) = canvas();
        let state = if wireframe { state.with_fill_mode(FillMode::Wireframe) } else { state };
        draw_circle(&mut img, &state, center, radius);
        assert_confined(&img);
    }

    /// Claim 17: Image and sprite blits with any finite placement stay
    /// inside the viewport without panicking
    #[test]
    fn claim_17_blits_confined(
        position in point(),
        src in rect(),
        dst in rect(),
        angle in -7.0f32..7.0,
        scale in 0.01f32..100.0,
    ) {
        let (mut img, state) = canvas();
        let sheet = Image::filled(4, 4, Color::RED);

        draw_image(&mut img, &state, &sheet, position);
        draw_image_scaled(&mut img, &state, &sheet, src, dst);
        draw_sprite(&mut img, &state, &Sprite::new(&sheet).with_region(src), position);
        let turned = Sprite::new(&sheet)
            .with_region(src)
            .with_transform(Transform2D::rotation(angle).then(Transform2D::scale(scale, scale)));
        draw_sprite(&mut img, &state, &turned, position);
        assert_confined(&img);
    }
}

/// Claim 18: A line between opposite corners of the f32 range crosses the
/// image along its main diagonal
#[test]
fn claim_18_far_line_keeps_its_slope() {
    let mut img = Image::new(16, 16);
    draw_line(&mut img, &counting_state(), Vec2::new(-3e38, -3e38), Vec2::new(3e38, 3e38));
    for y in 0..16u32 {
        for x in 0..16u32 {
            assert_eq!(
                img.get_pixel(x, y).unwrap().r,
                u8::from(x == y),
                "Claim 18 FALSIFIED at ({x}, {y})"
            );
        }
    }
}
