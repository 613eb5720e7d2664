use lane_defence_core::Vec2;

/// Reflects a velocity about a contact normal.
pub(crate) fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    let normal = normal.normalize_or_zero();
    if normal == Vec2::ZERO {
        return -velocity;
    }
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Blends a velocity toward the point, keeping the travel speed.
pub(crate) fn steer(
    velocity: Vec2,
    position: Vec2,
    toward: Vec2,
    speed: f32,
    blend: f32,
) -> Vec2 {
    let desired = (toward - position).normalize_or_zero() * speed;
    if desired == Vec2::ZERO {
        return velocity;
    }
    let blended = velocity.lerp(desired, blend.clamp(0.0, 1.0));
    match blended.try_normalize() {
        Some(direction) => direction * speed,
        None => desired,
    }
}

/// Height of a parabolic flight at `progress` in `[0, 1]`.
pub(crate) fn parabola(peak: f32, progress: f32) -> f32 {
    let t = progress.clamp(0.0, 1.0);
    4.0 * peak * t * (1.0 - t)
}
