//! Collision detection and response
//!
//! Two kinds of contact: a ball against the rails (with special handling at
//! corner pockets and pocket mouths) and ball against ball. Everything here
//! corrects anomalies geometrically instead of failing: a ball that ends up
//! somewhere it should not be is nudged back and, if need be, stopped.

use glam::Vec2;

use super::state::{Ball, BallState};
use super::table::{Edge, Table};
use crate::tuning::Tuning;

/// Distances below this are treated as coincident centers
const CONTACT_EPSILON: f32 = 0.01;

/// Outcome of rail resolution for one ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailOutcome {
    /// Nothing touched
    Clear,
    /// Bounced off (or was clamped against) at least one rail
    Bounced,
    /// Came to rest against a rail or in a corner jam
    Stopped,
    /// Coasting into a corner pocket, no bounce
    Coasting,
}

/// Resolve a ball against the rails
///
/// Callers skip this for balls inside an attraction zone.
pub fn resolve_rails(ball: &mut Ball, table: &Table, tuning: &Tuning) -> RailOutcome {
    let r = ball.radius;
    let clearance = r + tuning.rail_clearance;

    // Corner jam zones first: the ball can get wedged between rail and rim
    if let Some(pocket) = table
        .corner_pockets()
        .find(|p| p.in_jam_zone(ball.pos, r, tuning))
    {
        let mut against = [false; 2];
        for (edge, touching) in pocket.edges.iter().zip(against.iter_mut()) {
            if let Some(edge) = edge {
                *touching = rail_gap(ball, table, *edge) <= clearance;
                clamp_inside(ball, table, *edge, clearance);
            }
        }

        let speed = ball.speed();
        if speed < tuning.jam_stop_factor * tuning.min_velocity {
            ball.stop();
            return RailOutcome::Stopped;
        }
        if ball.vel.dot(pocket.center - ball.pos) > 0.0 {
            ball.vel *= tuning.jam_coast_decay;
            return RailOutcome::Coasting;
        }

        // Heading away from the pocket: bounce off whichever adjoining rail
        // the ball is pressed against, from the clamped spot
        let mut outcome = RailOutcome::Clear;
        for (edge, touching) in pocket.edges.iter().zip(against) {
            let Some(edge) = edge else {
                continue;
            };
            if !touching || !heading_into(ball.vel, *edge) {
                continue;
            }
            if speed < tuning.rail_stop_factor * tuning.min_velocity {
                ball.stop();
                return RailOutcome::Stopped;
            }
            reflect(ball, *edge, tuning.rail_restitution);
            outcome = RailOutcome::Bounced;
        }
        if outcome == RailOutcome::Bounced {
            return outcome;
        }
    }

    let pre_speed = ball.speed();
    let mut outcome = RailOutcome::Clear;

    for edge in Edge::ALL {
        if !crosses(ball, table, edge) || table.is_near_pocket_on(ball.pos, edge) {
            continue;
        }
        clamp_inside(ball, table, edge, clearance);
        if pre_speed < tuning.rail_stop_factor * tuning.min_velocity {
            ball.stop();
            outcome = RailOutcome::Stopped;
        } else if outcome != RailOutcome::Stopped {
            reflect(ball, edge, tuning.rail_restitution);
            outcome = RailOutcome::Bounced;
        }
    }

    if table.is_near_pocket(ball.pos) && clamp_outside_margin(ball, table, tuning) {
        if ball.vel == Vec2::ZERO {
            ball.state = BallState::Resting;
        }
        if outcome == RailOutcome::Clear {
            outcome = RailOutcome::Stopped;
        }
    }

    outcome
}

/// Whether the ball's rim is past `edge`
fn crosses(ball: &Ball, table: &Table, edge: Edge) -> bool {
    let r = ball.radius;
    match edge {
        Edge::Left => ball.pos.x - r < table.left(),
        Edge::Right => ball.pos.x + r > table.right(),
        Edge::Bottom => ball.pos.y - r < table.bottom(),
        Edge::Top => ball.pos.y + r > table.top(),
    }
}

/// Distance from the ball center to the line of `edge`, positive inside
fn rail_gap(ball: &Ball, table: &Table, edge: Edge) -> f32 {
    match edge {
        Edge::Left => ball.pos.x - table.left(),
        Edge::Right => table.right() - ball.pos.x,
        Edge::Bottom => ball.pos.y - table.bottom(),
        Edge::Top => table.top() - ball.pos.y,
    }
}

fn heading_into(vel: Vec2, edge: Edge) -> bool {
    match edge {
        Edge::Left => vel.x < 0.0,
        Edge::Right => vel.x > 0.0,
        Edge::Bottom => vel.y < 0.0,
        Edge::Top => vel.y > 0.0,
    }
}

fn reflect(ball: &mut Ball, edge: Edge, restitution: f32) {
    match edge {
        Edge::Left | Edge::Right => ball.vel.x = -ball.vel.x * restitution,
        Edge::Bottom | Edge::Top => ball.vel.y = -ball.vel.y * restitution,
    }
}

/// Keep the ball center at least `clearance` inside `edge`
fn clamp_inside(ball: &mut Ball, table: &Table, edge: Edge, clearance: f32) {
    match edge {
        Edge::Left => ball.pos.x = ball.pos.x.max(table.left() + clearance),
        Edge::Right => ball.pos.x = ball.pos.x.min(table.right() - clearance),
        Edge::Bottom => ball.pos.y = ball.pos.y.max(table.bottom() + clearance),
        Edge::Top => ball.pos.y = ball.pos.y.min(table.top() - clearance),
    }
}

/// Bound how far outside the table a near-pocket ball may drift
///
/// Returns true if the ball was clamped (and that velocity axis zeroed).
fn clamp_outside_margin(ball: &mut Ball, table: &Table, tuning: &Tuning) -> bool {
    let pocket_radius = table
        .pockets()
        .iter()
        .map(|p| p.visual_radius)
        .fold(0.0, f32::max);
    let margin = pocket_radius + ball.radius + tuning.outside_margin;
    let mut clamped = false;

    if ball.pos.x < table.left() - margin {
        ball.pos.x = table.left() - margin;
        ball.vel.x = 0.0;
        clamped = true;
    } else if ball.pos.x > table.right() + margin {
        ball.pos.x = table.right() + margin;
        ball.vel.x = 0.0;
        clamped = true;
    }
    if ball.pos.y < table.bottom() - margin {
        ball.pos.y = table.bottom() - margin;
        ball.vel.y = 0.0;
        clamped = true;
    } else if ball.pos.y > table.top() + margin {
        ball.pos.y = table.top() + margin;
        ball.vel.y = 0.0;
        clamped = true;
    }
    clamped
}

/// A resolved ball-ball contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the first ball toward the second
    pub normal: Vec2,
    /// Velocity change applied to the first ball (the second got the negation)
    pub impulse: Vec2,
    /// Total increase in center distance from the positional correction
    pub separation: f32,
}

/// Resolve one overlapping pair
///
/// Returns `None` when the balls do not overlap or their centers coincide.
pub fn resolve_pair(a: &mut Ball, b: &mut Ball, tuning: &Tuning) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;

    if distance >= min_distance || distance <= CONTACT_EPSILON {
        return None;
    }

    let normal = delta / distance;
    let overlap = min_distance - distance;
    let separation = overlap * tuning.separation_factor;

    a.pos -= normal * (separation * 0.5);
    b.pos += normal * (separation * 0.5);

    let rel_vel = b.vel - a.vel;
    let along_normal = rel_vel.dot(normal);

    let mut impulse = Vec2::ZERO;
    if along_normal < 0.0 || distance < min_distance * tuning.deep_overlap_ratio {
        // Separating pairs that are merely deep get no extra push
        let closing_speed = (-along_normal).max(0.0);
        impulse = -normal * (tuning.impulse_factor * closing_speed);
        a.vel += impulse;
        b.vel -= impulse;
        a.wake();
        b.wake();
    }

    Some(Contact {
        normal,
        impulse,
        separation,
    })
}

/// Relax all ball-ball overlaps
///
/// Runs `collision_iterations` sweeps over every unordered pair of balls on
/// the table that are clear of the pockets. Returns true if any pair touched
/// on the first sweep; `contacts` collects those first-sweep pairs.
pub fn resolve_collisions(
    balls: &mut [Ball],
    table: &Table,
    tuning: &Tuning,
    contacts: &mut Vec<(usize, usize)>,
) -> bool {
    let mut collided = false;
    let min_distance = balls.first().map(|b| b.radius * 2.0).unwrap_or(0.0);

    for iter in 0..tuning.collision_iterations {
        for i in 0..balls.len() {
            if !eligible(&balls[i], table) {
                continue;
            }
            for j in (i + 1)..balls.len() {
                if !eligible(&balls[j], table) {
                    continue;
                }
                // Cheap reject before splitting the borrow
                if (balls[j].pos - balls[i].pos).length_squared() >= min_distance * min_distance {
                    continue;
                }

                let (left, right) = balls.split_at_mut(j);
                let (a, b) = (&mut left[i], &mut right[0]);
                let Some(contact) = resolve_pair(a, b, tuning) else {
                    continue;
                };
                if iter == 0 {
                    collided = true;
                    contacts.push((i, j));
                    log::debug!(
                        "Collision: ball {} hit ball {} (impulse {:.3})",
                        i,
                        j,
                        contact.impulse.length()
                    );
                }
            }
        }
    }

    collided
}

/// Balls at or near a pocket fall through instead of colliding
fn eligible(ball: &Ball, table: &Table) -> bool {
    ball.on_table() && !table.is_in_attraction_zone(ball.pos) && !table.is_near_pocket(ball.pos)
}
