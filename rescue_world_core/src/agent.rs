use rand::{rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Direction, EntityId, Position,
    config::GameRules,
    outcome::GameCounters,
    poi::{PoiKind, PoiManager},
    world::{GridWorld, nearest},
};

const EXTINGUISH_COST: u32 = 2;
const SEARCH_COST: u32 = 1;
const PICK_UP_COST: u32 = 1;
const OPEN_DOOR_COST: u32 = 1;

/// Specialisation of a rescue agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Extinguisher,
    Searcher,
    Rescuer,
    DoorOpener,
}

impl Role {
    /// The standard team, in id order.
    pub const TEAM: [Role; 6] = [
        Role::Extinguisher,
        Role::Extinguisher,
        Role::Searcher,
        Role::Searcher,
        Role::Rescuer,
        Role::DoorOpener,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::Extinguisher => "extinguisher",
            Role::Searcher => "searcher",
            Role::Rescuer => "rescuer",
            Role::DoorOpener => "door opener",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Afk,
    MovingToTarget,
    /// Reserved for presentation; no role currently lingers in it.
    Working,
    CarryingVictim,
    /// Reserved for presentation; carrying rescuers use `CarryingVictim`.
    ReturningToBase,
}

/// How an agent chooses where to go when it has nothing to do in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Wander to a random discovered neighbour.
    Random,
    /// Head for the nearest known target with greedy steps.
    #[default]
    Strategy,
}

impl AgentMode {
    pub fn other(self) -> AgentMode {
        match self {
            AgentMode::Random => AgentMode::Strategy,
            AgentMode::Strategy => AgentMode::Random,
        }
    }
}

/// Simulation state lent to an agent for one activation.
pub struct ActionContext<'a> {
    pub world: &'a mut GridWorld,
    pub pois: &'a PoiManager,
    pub counters: &'a mut GameCounters,
    pub rules: &'a GameRules,
    pub rng: &'a mut StdRng,
}

/// A member of the rescue team.
///
/// Every activation performs at most one thing: a role-specific action on the
/// current cell (or next to it), or a single movement step. Points left over
/// at the end of the activation go unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueAgent {
    id: EntityId,
    role: Role,
    position: Position,
    action_points: u32,
    max_action_points: u32,
    state: BehaviorState,
    target: Option<Position>,
    carrying: bool,
    mode: AgentMode,
}

impl RescueAgent {
    pub fn new(
        id: EntityId,
        role: Role,
        position: Position,
        mode: AgentMode,
        max_action_points: u32,
    ) -> Self {
        Self {
            id,
            role,
            position,
            action_points: max_action_points,
            max_action_points,
            state: BehaviorState::Afk,
            target: None,
            carrying: false,
            mode,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn action_points(&self) -> u32 {
        self.action_points
    }

    pub fn max_action_points(&self) -> u32 {
        self.max_action_points
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Restores the full action point budget. Called at the start of each turn.
    pub fn refill(&mut self) {
        self.action_points = self.max_action_points;
    }

    /// Switches mode and drops any goal in progress.
    pub fn set_mode(&mut self, mode: AgentMode) {
        self.mode = mode;
        self.state = BehaviorState::Afk;
        self.target = None;
    }

    /// Runs one activation of this agent.
    pub fn act(&mut self, ctx: &mut ActionContext<'_>) {
        if self.action_points == 0 {
            return;
        }
        if self.role == Role::Rescuer {
            self.act_rescuer(ctx);
            return;
        }
        if self.attempt_local_action(ctx) {
            return;
        }
        match self.mode {
            AgentMode::Random => {
                self.move_randomly(ctx);
            }
            AgentMode::Strategy => {
                if self.state == BehaviorState::Afk {
                    if let Some(goal) = self.find_target(ctx.world) {
                        debug!(agent = self.id, role = self.role.label(), ?goal, "new target");
                        self.target = Some(goal);
                        self.state = BehaviorState::MovingToTarget;
                    }
                }
                if self.state == BehaviorState::MovingToTarget {
                    self.advance_to_target(ctx.world);
                }
            }
        }
    }

    /// The rescuer alternates between fetching a marked victim and carrying it
    /// out, so its activation is laid out separately.
    fn act_rescuer(&mut self, ctx: &mut ActionContext<'_>) {
        if self.carrying && self.deliver(ctx) {
            return;
        }
        if !self.carrying && self.pick_up(ctx) {
            return;
        }
        match self.mode {
            AgentMode::Random => {
                self.move_randomly(ctx);
            }
            AgentMode::Strategy if self.carrying => {
                if self.state != BehaviorState::CarryingVictim || self.target.is_none() {
                    self.state = BehaviorState::CarryingVictim;
                    self.target = ctx.world.nearest_entrance(self.position);
                }
                if let Some(exit) = self.target {
                    if self.step_toward(exit, ctx.world) {
                        self.deliver(ctx);
                    }
                }
            }
            AgentMode::Strategy => match self.state {
                BehaviorState::Afk => {
                    if let Some(goal) = self.find_target(ctx.world) {
                        debug!(agent = self.id, role = self.role.label(), ?goal, "new target");
                        self.target = Some(goal);
                        self.state = BehaviorState::MovingToTarget;
                    }
                }
                BehaviorState::MovingToTarget => self.advance_to_target(ctx.world),
                _ => {}
            },
        }
    }

    /// Tries the role's in-place action. Returns `true` if the activation is spent.
    pub fn attempt_local_action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        match self.role {
            Role::Extinguisher => self.extinguish(ctx),
            Role::Searcher => self.search(ctx),
            Role::Rescuer => {
                if self.carrying {
                    self.deliver(ctx)
                } else {
                    self.pick_up(ctx)
                }
            }
            Role::DoorOpener => self.open_door(ctx),
        }
    }

    /// Nearest known instance of what this role works on.
    pub fn find_target(&self, world: &GridWorld) -> Option<Position> {
        let here = self.position;
        match self.role {
            Role::Extinguisher => nearest(
                here,
                world.fire().iter().copied().filter(|p| world.is_discovered(*p)),
            ),
            Role::Searcher => nearest(
                here,
                world.pois().keys().copied().filter(|p| world.is_discovered(*p)),
            ),
            Role::Rescuer if self.carrying => world.nearest_entrance(here),
            Role::Rescuer => nearest(here, world.found_victims().iter().copied()),
            Role::DoorOpener => nearest(
                here,
                world
                    .closed_doors()
                    .keys()
                    .copied()
                    .filter(|p| world.is_discovered(*p) || world.has_discovered_neighbor(*p)),
            ),
        }
    }

    fn extinguish(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.action_points < EXTINGUISH_COST {
            return false;
        }
        let world = &mut *ctx.world;
        let burning = std::iter::once(self.position)
            .chain(world.neighbors(self.position))
            .find(|p| world.has_fire(*p));
        let Some(spot) = burning else {
            return false;
        };
        world.extinguish(spot);
        self.action_points -= EXTINGUISH_COST;
        debug!(agent = self.id, ?spot, "fire extinguished");
        true
    }

    fn search(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.action_points < SEARCH_COST {
            return false;
        }
        let here = self.position;
        let Some(kind) = ctx.pois.reveal(ctx.world, here, ctx.rng) else {
            return false;
        };
        self.action_points -= SEARCH_COST;

        match kind {
            PoiKind::FalseAlarm => {
                debug!(agent = self.id, pos = ?here, "false alarm");
                true
            }
            // A cell holds at most one marker, so a victim revealed on a
            // marked cell is treated like one revealed at the cap.
            PoiKind::Victim
                if ctx.world.found_victims().len() < ctx.rules.max_found_victims
                    && ctx.world.place_found_victim(here) =>
            {
                ctx.counters.found += 1;
                debug!(agent = self.id, pos = ?here, found = ctx.counters.found, "victim found");
                true
            }
            PoiKind::Victim => {
                debug!(agent = self.id, pos = ?here, "victim revealed with no free marker");
                false
            }
        }
    }

    fn pick_up(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.carrying
            || self.action_points < PICK_UP_COST
            || !ctx.world.remove_found_victim(self.position)
        {
            return false;
        }
        self.carrying = true;
        self.state = BehaviorState::CarryingVictim;
        self.target = ctx.world.nearest_entrance(self.position);
        self.action_points -= PICK_UP_COST;
        ctx.pois.replenish(ctx.world, ctx.rng);
        debug!(agent = self.id, pos = ?self.position, exit = ?self.target, "victim picked up");
        true
    }

    fn deliver(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if !self.carrying || !ctx.world.is_entrance(self.position) {
            return false;
        }
        ctx.counters.rescued += 1;
        ctx.counters.found = ctx.counters.found.saturating_sub(1);
        self.carrying = false;
        self.state = BehaviorState::Afk;
        self.target = None;
        debug!(agent = self.id, rescued = ctx.counters.rescued, "victim delivered");
        true
    }

    fn open_door(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.action_points < OPEN_DOOR_COST || !ctx.world.open_door(self.position) {
            return false;
        }
        self.action_points -= OPEN_DOOR_COST;
        ctx.world.discover_neighbors4(self.position);
        debug!(agent = self.id, pos = ?self.position, "door opened");
        true
    }

    fn move_randomly(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let options: Vec<Position> = ctx
            .world
            .neighbors(self.position)
            .filter(|p| ctx.world.is_discovered(*p))
            .collect();
        match options.choose(ctx.rng) {
            Some(&next) => self.enter(next, ctx.world),
            None => false,
        }
    }

    fn advance_to_target(&mut self, world: &mut GridWorld) {
        if let Some(goal) = self.target {
            if self.step_toward(goal, world) {
                self.state = BehaviorState::Afk;
                self.target = None;
            }
        }
    }

    /// Takes one greedy step toward `goal`, closing the larger axis gap first.
    /// Returns `true` once the agent stands on `goal`.
    pub fn step_toward(&mut self, goal: Position, world: &mut GridWorld) -> bool {
        if goal == self.position {
            return true;
        }
        world.discover_around(self.position);

        let Some(next) = greedy_step(self.position, goal) else {
            return false;
        };
        if !world.is_discovered(next) {
            return false;
        }
        self.enter(next, world) && next == goal
    }

    fn enter(&mut self, next: Position, world: &mut GridWorld) -> bool {
        let cost = world.movement_cost(next);
        if self.action_points < cost {
            return false;
        }
        self.position = next;
        self.action_points -= cost;
        world.discover_around(next);
        true
    }
}

fn greedy_step(from: Position, to: Position) -> Option<Position> {
    let dx = to.x as isize - from.x as isize;
    let dy = to.y as isize - from.y as isize;
    let direction = if dx.abs() > dy.abs() {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if dy != 0 {
        if dy > 0 { Direction::Down } else { Direction::Up }
    } else {
        return None;
    };
    from.step(direction)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    struct Fixture {
        world: GridWorld,
        pois: PoiManager,
        counters: GameCounters,
        rules: GameRules,
        rng: StdRng,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = GridWorld::new(8, 6);
            for y in 0..6 {
                for x in 0..8 {
                    world.discover_cell(pos(x, y));
                }
            }
            let rules = GameRules::default();
            Fixture {
                world,
                pois: PoiManager::from_rules(&rules),
                counters: GameCounters::default(),
                rules,
                rng: StdRng::seed_from_u64(17),
            }
        }

        fn ctx(&mut self) -> ActionContext<'_> {
            ActionContext {
                world: &mut self.world,
                pois: &self.pois,
                counters: &mut self.counters,
                rules: &self.rules,
                rng: &mut self.rng,
            }
        }
    }

    fn agent(role: Role, at: Position, mode: AgentMode) -> RescueAgent {
        RescueAgent::new(0, role, at, mode, 4)
    }

    #[test]
    fn greedy_step_closes_larger_gap_first() {
        assert_eq!(greedy_step(pos(0, 0), pos(3, 1)), Some(pos(1, 0)));
        assert_eq!(greedy_step(pos(0, 0), pos(1, 3)), Some(pos(0, 1)));
        assert_eq!(greedy_step(pos(2, 2), pos(0, 0)), Some(pos(2, 1)));
        assert_eq!(greedy_step(pos(2, 2), pos(2, 2)), None);
        assert_eq!(greedy_step(pos(4, 1), pos(1, 1)), Some(pos(3, 1)));
    }

    #[test]
    fn extinguisher_clears_adjacent_fire_for_two_points() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(3, 2));
        let mut a = agent(Role::Extinguisher, pos(2, 2), AgentMode::Strategy);

        a.act(&mut fx.ctx());

        assert!(!fx.world.has_fire(pos(3, 2)));
        assert!(fx.world.has_smoke(pos(3, 2)));
        assert_eq!(a.action_points(), 2);
        assert_eq!(a.position(), pos(2, 2));
    }

    #[test]
    fn extinguisher_prefers_its_own_cell() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(2, 2));
        fx.world.ignite(pos(2, 1));
        let mut a = agent(Role::Extinguisher, pos(2, 2), AgentMode::Random);

        a.act(&mut fx.ctx());

        assert!(!fx.world.has_fire(pos(2, 2)));
        assert!(fx.world.has_fire(pos(2, 1)));
    }

    #[test]
    fn extinguisher_without_enough_points_moves_instead() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(5, 2));
        let mut a = RescueAgent::new(0, Role::Extinguisher, pos(4, 2), AgentMode::Strategy, 1);

        a.act(&mut fx.ctx());

        assert!(fx.world.has_fire(pos(5, 2)));
        assert_eq!(a.position(), pos(4, 2), "fire costs 2 to enter");
        assert_eq!(a.state(), BehaviorState::MovingToTarget);
        assert_eq!(a.action_points(), 1);
    }

    #[test]
    fn strategy_agent_targets_nearest_and_steps() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(7, 5));
        fx.world.ignite(pos(4, 0));
        let mut a = agent(Role::Extinguisher, pos(0, 0), AgentMode::Strategy);

        a.act(&mut fx.ctx());

        assert_eq!(a.target(), Some(pos(4, 0)));
        assert_eq!(a.state(), BehaviorState::MovingToTarget);
        assert_eq!(a.position(), pos(1, 0));
        assert_eq!(a.action_points(), 3);
    }

    #[test]
    fn reaching_the_goal_returns_to_afk() {
        let mut fx = Fixture::new();
        fx.world.insert_poi(pos(1, 0), PoiKind::FalseAlarm);
        let mut a = agent(Role::Searcher, pos(0, 0), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert_eq!(a.position(), pos(1, 0));
        assert_eq!(a.state(), BehaviorState::Afk);
        assert_eq!(a.target(), None);
    }

    #[test]
    fn greedy_step_discovers_ahead_of_itself() {
        let mut world = GridWorld::new(8, 6);
        world.discover_cell(pos(0, 0));
        let mut a = agent(Role::Searcher, pos(0, 0), AgentMode::Strategy);

        // The first step discovers the neighbours, so the move succeeds.
        assert!(!a.step_toward(pos(3, 0), &mut world));
        assert_eq!(a.position(), pos(1, 0));

        let mut fresh = GridWorld::new(8, 6);
        let mut b = agent(Role::Searcher, pos(5, 5), AgentMode::Strategy);
        b.step_toward(pos(5, 3), &mut fresh);
        assert_eq!(b.position(), pos(5, 4));
        assert!(fresh.is_discovered(pos(5, 3)));
    }

    #[test]
    fn searcher_marks_victims_up_to_the_cap() {
        let mut fx = Fixture::new();
        fx.world.place_found_victim(pos(7, 0));
        fx.world.insert_poi(pos(2, 2), PoiKind::Victim);
        let mut a = agent(Role::Searcher, pos(2, 2), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert!(fx.world.has_found_victim(pos(2, 2)));
        assert_eq!(fx.counters.found, 1);
        assert_eq!(a.action_points(), 3);
        assert_eq!(fx.world.pois().len(), fx.rules.active_pois);

        fx.world.remove_poi(pos(4, 4));
        fx.world.insert_poi(pos(4, 4), PoiKind::Victim);
        let mut b = agent(Role::Searcher, pos(4, 4), AgentMode::Random);
        b.refill();
        b.act(&mut fx.ctx());
        assert!(!fx.world.has_found_victim(pos(4, 4)));
        assert_eq!(fx.world.found_victims().len(), 2);
        assert_eq!(fx.counters.found, 1);
    }

    #[test]
    fn victim_revealed_on_a_marked_cell_is_not_counted_twice() {
        let mut fx = Fixture::new();
        fx.world.place_found_victim(pos(2, 2));
        fx.counters.found = 1;
        fx.world.insert_poi(pos(2, 2), PoiKind::Victim);
        let mut a = agent(Role::Searcher, pos(2, 2), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert_eq!(fx.world.found_victims().len(), 1);
        assert_eq!(fx.counters.found, 1);
        assert!(a.action_points() <= 3, "the reveal still costs a point");
    }

    #[test]
    fn searcher_false_alarm_consumes_a_point() {
        let mut fx = Fixture::new();
        fx.world.insert_poi(pos(3, 3), PoiKind::FalseAlarm);
        let mut a = agent(Role::Searcher, pos(3, 3), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert_eq!(a.action_points(), 3);
        assert_eq!(a.position(), pos(3, 3));
        assert!(fx.world.found_victims().is_empty());
    }

    #[test]
    fn rescuer_picks_up_and_targets_nearest_entrance() {
        let mut fx = Fixture::new();
        fx.world.add_entrance(pos(0, 5));
        fx.world.add_entrance(pos(7, 0));
        fx.world.place_found_victim(pos(5, 1));
        fx.counters.found = 1;
        let mut a = RescueAgent::new(4, Role::Rescuer, pos(5, 1), AgentMode::Strategy, 1);

        a.act(&mut fx.ctx());

        assert!(a.is_carrying());
        assert!(!fx.world.has_found_victim(pos(5, 1)));
        assert_eq!(a.state(), BehaviorState::CarryingVictim);
        assert_eq!(a.target(), Some(pos(7, 0)));
        assert_eq!(a.action_points(), 0);
    }

    #[test]
    fn rescuer_delivers_on_arrival_at_the_entrance() {
        let mut fx = Fixture::new();
        fx.world.add_entrance(pos(0, 0));
        fx.world.place_found_victim(pos(1, 0));
        fx.counters.found = 1;
        let mut a = agent(Role::Rescuer, pos(1, 0), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert!(a.is_carrying());

        a.refill();
        a.act(&mut fx.ctx());
        assert_eq!(a.position(), pos(0, 0));
        assert!(!a.is_carrying());
        assert_eq!(fx.counters.rescued, 1);
        assert_eq!(fx.counters.found, 0);
        assert_eq!(a.state(), BehaviorState::Afk);
    }

    #[test]
    fn rescuer_acquires_a_target_before_moving() {
        let mut fx = Fixture::new();
        fx.world.place_found_victim(pos(4, 0));
        let mut a = agent(Role::Rescuer, pos(0, 0), AgentMode::Strategy);

        a.act(&mut fx.ctx());
        assert_eq!(a.state(), BehaviorState::MovingToTarget);
        assert_eq!(a.position(), pos(0, 0));

        a.refill();
        a.act(&mut fx.ctx());
        assert_eq!(a.position(), pos(1, 0));
    }

    #[test]
    fn door_opener_opens_and_discovers() {
        let mut world = GridWorld::new(8, 6);
        world.discover_cell(pos(3, 3));
        world.add_closed_door(pos(3, 3), Direction::Down);
        let rules = GameRules::default();
        let pois = PoiManager::from_rules(&rules);
        let mut counters = GameCounters::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = agent(Role::DoorOpener, pos(3, 3), AgentMode::Strategy);

        a.act(&mut ActionContext {
            world: &mut world,
            pois: &pois,
            counters: &mut counters,
            rules: &rules,
            rng: &mut rng,
        });

        assert!(!world.has_closed_door(pos(3, 3)));
        assert!(world.open_doors().contains_key(&pos(3, 3)));
        assert!(world.is_discovered(pos(3, 4)) && world.is_discovered(pos(2, 3)));
        assert_eq!(a.action_points(), 3);
    }

    #[test]
    fn door_opener_only_targets_doors_at_the_frontier() {
        let mut world = GridWorld::new(8, 6);
        world.discover_cell(pos(0, 0));
        world.add_closed_door(pos(1, 0), Direction::Right);
        world.add_closed_door(pos(6, 5), Direction::Left);
        let a = agent(Role::DoorOpener, pos(7, 5), AgentMode::Strategy);
        assert_eq!(a.find_target(&world), Some(pos(1, 0)));
    }

    #[test]
    fn random_mode_only_wanders_into_discovered_cells() {
        let mut fx = Fixture::new();
        fx.world = GridWorld::new(8, 6);
        fx.world.discover_cell(pos(2, 2));
        fx.world.discover_cell(pos(2, 3));
        let mut a = agent(Role::Extinguisher, pos(2, 2), AgentMode::Random);

        a.act(&mut fx.ctx());
        assert_eq!(a.position(), pos(2, 3));
        assert_eq!(a.action_points(), 3);
        assert!(fx.world.is_discovered(pos(1, 3)));
    }

    #[test]
    fn exhausted_agents_do_nothing() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(1, 0));
        let mut a = RescueAgent::new(0, Role::Extinguisher, pos(0, 0), AgentMode::Strategy, 0);
        a.act(&mut fx.ctx());
        assert!(fx.world.has_fire(pos(1, 0)));
        assert_eq!(a.state(), BehaviorState::Afk);
    }

    #[test]
    fn mode_change_clears_goal_state() {
        let mut fx = Fixture::new();
        fx.world.ignite(pos(7, 5));
        let mut a = agent(Role::Extinguisher, pos(0, 0), AgentMode::Strategy);
        a.act(&mut fx.ctx());
        assert!(a.target().is_some());

        a.set_mode(AgentMode::Random);
        assert_eq!(a.mode(), AgentMode::Random);
        assert_eq!(a.state(), BehaviorState::Afk);
        assert_eq!(a.target(), None);
    }

    #[test]
    fn carrying_rescuer_recovers_its_exit_after_mode_change() {
        let mut fx = Fixture::new();
        fx.world.add_entrance(pos(0, 0));
        fx.world.place_found_victim(pos(3, 0));
        let mut a = agent(Role::Rescuer, pos(3, 0), AgentMode::Strategy);
        a.act(&mut fx.ctx());
        assert!(a.is_carrying());

        a.set_mode(AgentMode::Strategy);
        a.refill();
        a.act(&mut fx.ctx());
        assert_eq!(a.state(), BehaviorState::CarryingVictim);
        assert_eq!(a.target(), Some(pos(0, 0)));
        assert_eq!(a.position(), pos(2, 0));
    }
}
