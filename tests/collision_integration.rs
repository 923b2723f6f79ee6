//! Collision detection integration tests: pair firing, separation, distance
//! rejection, in-callback removal and the collision-driven traits.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::DVec2;

use scrollkit::components::entity::{Entity, EntityId};
use scrollkit::events::lifecycle::{EntityEvent, EntityEventKind, Lifecycle, Surface};
use scrollkit::events::world::{WorldEvent, WorldEventKind};
use scrollkit::traits::attach::EVENT_ATTACH;
use scrollkit::traits::health::EVENT_DEATH;
use scrollkit::traits::{Attach, Contact, DeathZone, Health, Physics, Solid, Trait};
use scrollkit::world::World;

const STEP: f64 = 1.0 / 120.0;
const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn boxed(name: &str, x: f64, y: f64, w: f64, h: f64) -> Entity {
    let mut e = Entity::named(name);
    e.add_collision_rect(w, h, 0.0, 0.0);
    e.move_to(DVec2::new(x, y));
    e
}

/// Count `kind` events heard on `id`'s bus.
fn count_events(world: &World, id: EntityId, kind: EntityEventKind) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    world
        .get(id)
        .expect("live entity")
        .events()
        .on(kind, move |_| c.set(c.get() + 1));
    count
}

fn run_steps(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.simulate_time(STEP);
    }
}

#[test]
fn moving_overlap_collides_once_per_step_on_both_sides() {
    let mut world = World::new();
    let mut mover = boxed("mover", 0.0, 0.0, 10.0, 10.0);
    mover.velocity = DVec2::new(1.0, 0.0);
    let a = world.add_object(mover).expect("mover");
    let b = world.add_object(boxed("still", 2.0, 0.0, 10.0, 10.0)).expect("still");

    let on_a = count_events(&world, a, EntityEventKind::Collide);
    let on_b = count_events(&world, b, EntityEventKind::Collide);
    run_steps(&mut world, 5);

    assert_eq!(on_a.get(), 5);
    assert_eq!(on_b.get(), 5);
    assert!(world.collision().is_colliding(a, b));
    assert!(world.collision().is_colliding(b, a));
}

#[test]
fn resting_overlap_collides_only_on_the_first_step() {
    let mut world = World::new();
    let a = world.add_object(boxed("a", 0.0, 0.0, 10.0, 10.0)).expect("a");
    let b = world.add_object(boxed("b", 2.0, 0.0, 10.0, 10.0)).expect("b");
    let on_a = count_events(&world, a, EntityEventKind::Collide);
    let on_b = count_events(&world, b, EntityEventKind::Collide);

    run_steps(&mut world, 10);

    assert_eq!(on_a.get(), 1);
    assert_eq!(on_b.get(), 1);
    // Still recorded as colliding even though nobody re-checks the pair.
    assert!(world.collision().is_colliding(a, b));
}

#[test]
fn separation_uncollides_exactly_once() {
    let mut world = World::new();
    let a = world.add_object(boxed("a", 0.0, 0.0, 2.0, 2.0)).expect("a");
    let b = world.add_object(boxed("b", 1.0, 0.0, 2.0, 2.0)).expect("b");
    let off_a = count_events(&world, a, EntityEventKind::Uncollide);
    let off_b = count_events(&world, b, EntityEventKind::Uncollide);

    world.simulate_time(STEP);
    assert!(world.collision().is_colliding(a, b));

    world.get_mut(a).expect("a").move_to(DVec2::new(10.0, 0.0));
    world.simulate_time(STEP);
    world.simulate_time(STEP);
    world.get_mut(a).expect("a").move_to(DVec2::new(20.0, 0.0));
    world.simulate_time(STEP);

    assert_eq!(off_a.get(), 1);
    assert_eq!(off_b.get(), 1);
    assert!(!world.collision().is_colliding(a, b));
    assert!(world.collision().colliding_with(b).is_empty());
}

#[test]
fn pairs_beyond_the_collision_radius_are_not_tested() {
    let mut world = World::new();
    world.set_collision_radius(5.0);
    let a = world.add_object(boxed("a", 0.0, 0.0, 30.0, 30.0)).expect("a");
    let b = world.add_object(boxed("b", 10.0, 0.0, 30.0, 30.0)).expect("b");
    let on_a = count_events(&world, a, EntityEventKind::Collide);

    world.simulate_time(STEP);

    assert_eq!(on_a.get(), 0);
    assert!(!world.collision().is_colliding(a, b));
}

#[test]
fn leaving_the_collision_radius_counts_as_separation() {
    let mut world = World::new();
    let a = world.add_object(boxed("a", 0.0, 0.0, 30.0, 30.0)).expect("a");
    let b = world.add_object(boxed("b", 10.0, 0.0, 30.0, 30.0)).expect("b");
    let off_b = count_events(&world, b, EntityEventKind::Uncollide);

    world.simulate_time(STEP);
    assert!(world.collision().is_colliding(a, b));

    // Boxes still overlap, but the centres are now too far apart to test.
    world.set_collision_radius(5.0);
    world.get_mut(a).expect("a").nudge(0.5, 0.0);
    world.simulate_time(STEP);

    assert_eq!(off_b.get(), 1);
    assert!(!world.collision().is_colliding(a, b));
}

/// Removes its host on the first contact.
struct Fragile;

impl Trait for Fragile {
    fn name(&self) -> &str {
        "fragile"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::Collide]
    }

    fn collides(&mut self, host: &mut Entity, _other: &mut Entity, _contact: &Contact) {
        host.remove_from_world();
    }
}

#[test]
fn removal_inside_a_collide_callback_keeps_the_pass_intact() {
    let mut world = World::new();
    let mut bullet = boxed("bullet", 0.0, 0.0, 40.0, 4.0);
    bullet.apply_trait(Fragile).expect("fragile");
    let bullet = world.add_object(bullet).expect("bullet");
    let left = world.add_object(boxed("left", -15.0, 0.0, 4.0, 4.0)).expect("left");
    let right = world.add_object(boxed("right", 15.0, 0.0, 4.0, 4.0)).expect("right");

    let hit_left = count_events(&world, left, EntityEventKind::Collide);
    let hit_right = count_events(&world, right, EntityEventKind::Collide);
    let removed = Rc::new(RefCell::new(Vec::new()));
    let r = Rc::clone(&removed);
    world.events().on(WorldEventKind::Removed, move |e| {
        if let WorldEvent::Removed(id) = e {
            r.borrow_mut().push(*id);
        }
    });

    world.simulate_time(STEP);

    assert_eq!(hit_left.get(), 1);
    assert_eq!(hit_right.get(), 1);
    assert!(!world.contains(bullet));
    assert_eq!(*removed.borrow(), vec![bullet]);

    world.simulate_time(STEP);
    assert!(world.collision().colliding_with(left).is_empty());
}

/// Records which box indices each contact reported.
struct ContactLog(Rc<RefCell<Vec<(usize, usize)>>>);

impl Trait for ContactLog {
    fn name(&self) -> &str {
        "contact_log"
    }

    fn collides(&mut self, _host: &mut Entity, _other: &mut Entity, contact: &Contact) {
        self.0.borrow_mut().push((contact.our_index, contact.their_index));
    }
}

// Known approximation: only the first overlapping box pair is reported, even
// when several of the host's boxes touch at once.
#[test]
fn only_the_first_overlapping_box_pair_is_reported() {
    let mut world = World::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut twin = Entity::named("twin");
    twin.add_collision_rect(2.0, 2.0, -5.0, 0.0);
    twin.add_collision_rect(2.0, 2.0, 5.0, 0.0);
    twin.apply_trait(ContactLog(Rc::clone(&log))).expect("log");
    world.add_object(twin).expect("twin");

    let mut bar = boxed("bar", 0.0, 0.0, 20.0, 2.0);
    bar.add_collision_rect(20.0, 2.0, 0.0, 0.0);
    world.add_object(bar).expect("bar");

    world.simulate_time(STEP);

    assert_eq!(*log.borrow(), vec![(0, 0)]);
}

#[test]
fn solid_floor_stops_a_falling_body() {
    let mut world = World::new();
    world.forces.gravity = DVec2::new(0.0, -900.0);

    let mut floor = boxed("floor", 0.0, 0.0, 100.0, 10.0);
    floor.apply_trait(Solid::new()).expect("solid");
    world.add_object(floor).expect("floor");

    let mut body = boxed("body", 0.0, 20.0, 10.0, 10.0);
    body.apply_trait(Physics::new(1.0)).expect("physics");
    let body = world.add_object(body).expect("body");

    let landings = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&landings);
    world.get(body).expect("body").events().on(EntityEventKind::Obstruct, move |e| {
        if let EntityEvent::Obstruct { attack, .. } = e {
            l.borrow_mut().push(*attack);
        }
    });

    run_steps(&mut world, 240);

    let body = world.get(body).expect("body");
    // Floor top is at 5; the body is 10 tall.
    assert!(approx_eq(body.position().y(), 10.0));
    assert_eq!(body.velocity.y, 0.0);
    assert!(!landings.borrow().is_empty());
    assert!(landings.borrow().iter().all(|s| *s == Surface::Bottom));
}

#[test]
fn disabled_physics_is_pushed_out_but_keeps_its_velocity() {
    let mut world = World::new();
    let mut floor = boxed("floor", 0.0, 0.0, 100.0, 10.0);
    floor.apply_trait(Solid::new()).expect("solid");
    world.add_object(floor).expect("floor");

    let mut body = boxed("body", 0.0, 20.0, 10.0, 10.0);
    body.apply_trait(Physics::new(1.0)).expect("physics");
    body.disable_trait::<Physics>().expect("physics");
    body.velocity = DVec2::new(0.0, -120.0);
    let body = world.add_object(body).expect("body");

    let landings = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&landings);
    world.get(body).expect("body").events().on(EntityEventKind::Obstruct, move |e| {
        if let EntityEvent::Obstruct { attack, .. } = e {
            l.borrow_mut().push(*attack);
        }
    });

    run_steps(&mut world, 40);

    let body = world.get(body).expect("body");
    assert!(!landings.borrow().is_empty());
    assert!(landings.borrow().iter().all(|s| *s == Surface::Bottom));
    // The solid still pushed the body out; only the velocity response is skipped.
    assert!(approx_eq(body.position().y(), 10.0));
    assert_eq!(body.velocity.y, -120.0);
}

#[test]
fn one_way_platform_lets_bodies_through_from_below() {
    let mut world = World::new();
    let mut ledge = boxed("ledge", 0.0, 0.0, 100.0, 4.0);
    ledge.apply_trait(Solid::one_way()).expect("solid");
    world.add_object(ledge).expect("ledge");

    let mut jumper = boxed("jumper", 0.0, -5.0, 4.0, 8.0);
    jumper.velocity = DVec2::new(0.0, 120.0);
    let jumper = world.add_object(jumper).expect("jumper");
    let blocked = count_events(&world, jumper, EntityEventKind::Obstruct);

    // Rising from below: the jumper's top stays the shallowest penetration.
    run_steps(&mut world, 3);

    assert_eq!(blocked.get(), 0);
    assert!(world.get(jumper).expect("jumper").position().y() > -5.0);
}

#[test]
fn death_zone_kills_health() {
    let mut world = World::new();
    let mut pit = boxed("pit", 0.0, 0.0, 100.0, 10.0);
    pit.apply_trait(DeathZone).expect("zone");
    world.add_object(pit).expect("pit");

    let mut hero = boxed("hero", 0.0, 4.0, 10.0, 10.0);
    hero.apply_trait(Health::new(10.0)).expect("health");
    let hero = world.add_object(hero).expect("hero");
    let deaths = count_events(&world, hero, EntityEventKind::Custom(EVENT_DEATH));

    run_steps(&mut world, 3);

    let hero = world.get(hero).expect("zones only kill, they do not remove");
    assert!(hero.get_trait::<Health>().expect("health").is_depleted());
    assert_eq!(hero.signals.get_scalar("health"), Some(0.0));
    assert_eq!(deaths.get(), 1);
}

#[test]
fn disabled_death_zone_still_hears_collisions() {
    let mut world = World::new();
    let mut pit = boxed("pit", 0.0, 0.0, 100.0, 10.0);
    pit.apply_trait(DeathZone).expect("zone");
    pit.disable_trait::<DeathZone>().expect("present");
    world.add_object(pit).expect("pit");

    let mut hero = boxed("hero", 0.0, 4.0, 10.0, 10.0);
    hero.apply_trait(Health::new(10.0)).expect("health");
    let hero = world.add_object(hero).expect("hero");

    world.simulate_time(STEP);

    assert!(world.get(hero).expect("hero").get_trait::<Health>().expect("health").is_depleted());
}

#[test]
fn arrow_sticks_to_the_side_of_a_wall_and_follows_it() {
    let mut world = World::new();
    let mut wall = boxed("wall", 100.0, 0.0, 20.0, 200.0);
    wall.apply_trait(Solid::new()).expect("solid");
    let wall = world.add_object(wall).expect("wall");

    let mut arrow = boxed("arrow", 0.0, 0.0, 10.0, 2.0);
    arrow.velocity = DVec2::new(300.0, 0.0);
    let mut physics = Physics::new(1.0);
    physics.gravity_scale = 0.0;
    arrow.apply_trait(physics).expect("physics");
    arrow.apply_trait(Attach::new()).expect("attach");
    let arrow = world.add_object(arrow).expect("arrow");
    let stuck = count_events(&world, arrow, EntityEventKind::Custom(EVENT_ATTACH));

    run_steps(&mut world, 60);

    {
        let arrow = world.get(arrow).expect("arrow");
        assert!(arrow.get_trait::<Attach>().expect("attach").is_attached());
        assert_eq!(arrow.velocity, DVec2::ZERO);
        assert!(!arrow.collidable);
        assert!(!arrow.is_trait_enabled::<Physics>());
        // Wall's left face is at 90; the arrow is 10 long.
        assert!(approx_eq(arrow.position().x(), 85.0));
    }
    assert_eq!(stuck.get(), 1);

    world.get_mut(wall).expect("wall").move_to(DVec2::new(150.0, 0.0));
    world.simulate_time(STEP);
    assert!(approx_eq(world.get(arrow).expect("arrow").position().x(), 135.0));
}

#[test]
fn arrow_without_physics_still_sticks() {
    let mut world = World::new();
    let mut wall = boxed("wall", 100.0, 0.0, 20.0, 200.0);
    wall.apply_trait(Solid::new()).expect("solid");
    world.add_object(wall).expect("wall");

    let mut arrow = boxed("arrow", 0.0, 0.0, 10.0, 2.0);
    arrow.velocity = DVec2::new(300.0, 0.0);
    arrow.apply_trait(Attach::new()).expect("attach");
    let arrow = world.add_object(arrow).expect("arrow");

    run_steps(&mut world, 60);

    let arrow = world.get(arrow).expect("arrow");
    assert!(arrow.get_trait::<Attach>().expect("attach").is_attached());
    assert_eq!(arrow.velocity, DVec2::ZERO);
    assert!(approx_eq(arrow.position().x(), 85.0));
}

#[test]
fn attach_only_nudges_on_vertical_hits() {
    let mut world = World::new();
    let mut floor = boxed("floor", 0.0, 0.0, 100.0, 10.0);
    floor.apply_trait(Solid::new()).expect("solid");
    world.add_object(floor).expect("floor");

    let mut dart = boxed("dart", 0.0, 5.5, 4.0, 2.0);
    dart.apply_trait(Attach::new()).expect("attach");
    let dart = world.add_object(dart).expect("dart");

    world.simulate_time(STEP);

    let dart = world.get(dart).expect("dart");
    assert!(!dart.get_trait::<Attach>().expect("attach").is_attached());
    assert!(dart.collidable);
    assert!(approx_eq(dart.position().y(), 6.0));
}
