//! Tower combat resolution and projectile flight.
//!
//! Combat runs in two passes per tick. The first pass cools every tower
//! down and acquires targets in batch over immutable snapshots; the second
//! pass fires the towers whose cooldown elapsed. Towers whose assignment
//! went stale mid-pass retry shortly instead of idling a full attack
//! interval.

use std::mem;
use std::time::Duration;

use lane_defence_core::{
    EnemyId, EnemyView, Event, PayloadSpec, Position, ProjectileId, SkillSpec, TowerTier,
    TowerView,
};

use crate::{
    apply_hit, World, MIN_RAPID_FIRE_DIVISOR, PIERCE_DAMAGE_FACTOR, PIERCE_RADIUS,
    PROJECTILE_SPEED, RETRY_DELAY, SPLASH_DAMAGE_FACTOR,
};

/// Projectile in flight toward a locked target.
///
/// Damage and payload are frozen at launch time, so upgrading or selling
/// the source tower never changes shots already in the air.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Position,
    pub(crate) target: EnemyId,
    pub(crate) damage: f32,
    pub(crate) payload: Option<PayloadSpec>,
}

impl World {
    /// Cools towers down, acquires targets, and fires ready towers.
    pub(crate) fn resolve_combat(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for tower in self.towers.iter_mut() {
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }

        let towers = TowerView::from_snapshots(self.tower_snapshots());
        let enemies = EnemyView::from_snapshots(self.enemy_snapshots());
        let mut assignments = mem::take(&mut self.assignments);
        self.targeting.acquire(&towers, &enemies, &mut assignments);

        let clock = self.clock;
        for tower in self.towers.iter_mut() {
            if !tower.cooldown.is_zero() {
                continue;
            }
            let Some(tier) = self
                .catalog
                .tower(tower.class)
                .and_then(|spec| spec.tier(tower.tier))
            else {
                continue;
            };
            let target = assignments
                .binary_search_by_key(&tower.id, |assignment| assignment.tower)
                .ok()
                .map(|index| assignments[index].enemy);
            let Some(target) = target else {
                tower.cooldown = RETRY_DELAY;
                continue;
            };

            if tier.melee {
                let struck = match self.enemies.iter_mut().find(|enemy| enemy.id == target) {
                    Some(enemy) if enemy.is_alive() => {
                        let _ = apply_hit(enemy, tier.damage, &mut self.money, out_events);
                        true
                    }
                    _ => false,
                };
                tower.cooldown = if struck {
                    effective_interval(tier, tower.rapid_fire_until, clock)
                } else {
                    RETRY_DELAY
                };
            } else {
                let target_alive = self
                    .enemies
                    .iter()
                    .any(|enemy| enemy.id == target && enemy.is_alive());
                if target_alive {
                    let id = self.next_projectile_id;
                    self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
                    self.projectiles.push(Projectile {
                        id,
                        position: tower.position,
                        target,
                        damage: tier.damage,
                        payload: tier.payload,
                    });
                    tower.cooldown = effective_interval(tier, tower.rapid_fire_until, clock);
                } else {
                    tower.cooldown = RETRY_DELAY;
                }
            }
        }

        assignments.clear();
        self.assignments = assignments;
    }

    /// Homes every projectile toward its target and settles impacts.
    ///
    /// Projectiles whose target already died are discarded without
    /// detonating.
    pub(crate) fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let step = PROJECTILE_SPEED * dt.as_secs_f32();
        let mut index = 0;
        while index < self.projectiles.len() {
            let projectile = self.projectiles[index];
            let Some(target_index) = self
                .enemies
                .iter()
                .position(|enemy| enemy.id == projectile.target && enemy.is_alive())
            else {
                let _ = self.projectiles.remove(index);
                continue;
            };
            let target_position = self.enemies[target_index].position;
            let (position, arrived) = projectile.position.step_toward(target_position, step);
            if arrived {
                let _ = self.projectiles.remove(index);
                self.impact(
                    target_index,
                    target_position,
                    projectile.damage,
                    projectile.payload,
                    out_events,
                );
            } else {
                self.projectiles[index].position = position;
                index += 1;
            }
        }
    }

    /// Settles one projectile impact: direct hit, then splash, burn, and
    /// pierce in that order.
    fn impact(
        &mut self,
        target_index: usize,
        impact_point: Position,
        damage: f32,
        payload: Option<PayloadSpec>,
        out_events: &mut Vec<Event>,
    ) {
        let _ = apply_hit(
            &mut self.enemies[target_index],
            damage,
            &mut self.money,
            out_events,
        );
        let Some(payload) = payload else {
            return;
        };

        if let Some(radius) = payload.splash_radius {
            let radius_squared = radius * radius;
            for (index, other) in self.enemies.iter_mut().enumerate() {
                if index == target_index || !other.is_alive() {
                    continue;
                }
                if other.position.distance_squared(impact_point) > radius_squared {
                    continue;
                }
                let _ = apply_hit(
                    other,
                    damage * SPLASH_DAMAGE_FACTOR,
                    &mut self.money,
                    out_events,
                );
            }
        }

        if let Some(burn) = payload.burn {
            let enemy = &mut self.enemies[target_index];
            if enemy.is_alive() {
                enemy.burn_damage_per_second =
                    enemy.burn_damage_per_second.max(burn.damage_per_second);
                enemy.burn_until = enemy.burn_until.max(self.clock + burn.duration);
            }
        }

        if payload.pierce > 0 {
            let mut best: Option<(usize, f32)> = None;
            for (index, other) in self.enemies.iter().enumerate() {
                if index == target_index || !other.is_alive() {
                    continue;
                }
                let distance = other.position.distance(impact_point);
                if distance > PIERCE_RADIUS {
                    continue;
                }
                match best {
                    Some((_, best_distance)) if distance >= best_distance => {}
                    _ => best = Some((index, distance)),
                }
            }
            if let Some((index, _)) = best {
                let _ = apply_hit(
                    &mut self.enemies[index],
                    damage * PIERCE_DAMAGE_FACTOR,
                    &mut self.money,
                    out_events,
                );
            }
        }
    }
}

/// Attack interval for the tier, shortened while a rapid-fire buff holds.
fn effective_interval(tier: &TowerTier, rapid_fire_until: Duration, clock: Duration) -> Duration {
    let Some(SkillSpec::RapidFire { attack_speed, .. }) = tier.skill else {
        return tier.attack_interval;
    };
    if clock < rapid_fire_until {
        tier.attack_interval
            .div_f32(attack_speed.max(MIN_RAPID_FIRE_DIVISOR))
    } else {
        tier.attack_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier_with_skill(skill: Option<SkillSpec>) -> TowerTier {
        TowerTier {
            title: String::from("Test"),
            cost: 100,
            range: 80.0,
            attack_interval: Duration::from_millis(800),
            damage: 10.0,
            melee: true,
            targets_flying: false,
            skill,
            payload: None,
        }
    }

    #[test]
    fn interval_is_unchanged_without_a_skill() {
        let tier = tier_with_skill(None);
        let interval = effective_interval(&tier, Duration::from_secs(10), Duration::ZERO);
        assert_eq!(interval, Duration::from_millis(800));
    }

    #[test]
    fn rapid_fire_divides_the_interval_while_active() {
        let tier = tier_with_skill(Some(SkillSpec::RapidFire {
            cooldown: Duration::from_secs(22),
            duration: Duration::from_secs(6),
            attack_speed: 2.0,
        }));
        let interval = effective_interval(&tier, Duration::from_secs(10), Duration::from_secs(5));
        assert!((interval.as_secs_f32() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn rapid_fire_lapses_once_the_buff_expires() {
        let tier = tier_with_skill(Some(SkillSpec::RapidFire {
            cooldown: Duration::from_secs(22),
            duration: Duration::from_secs(6),
            attack_speed: 2.0,
        }));
        let interval = effective_interval(&tier, Duration::from_secs(5), Duration::from_secs(5));
        assert_eq!(interval, Duration::from_millis(800));
    }

    #[test]
    fn other_skills_never_shorten_the_interval() {
        let tier = tier_with_skill(Some(SkillSpec::Shockwave {
            cooldown: Duration::from_secs(18),
            radius: 110.0,
            damage_factor: 2.0,
            stun: Duration::from_millis(800),
        }));
        let interval = effective_interval(&tier, Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(interval, Duration::from_millis(800));
    }
}
