//! Episode loop
//!
//! Advances one generation's birds through the pipe course one tick at a
//! time. The per-tick order is fixed:
//!
//! 1. pick the target pipe
//! 2. reward survival, ask each agent, flap, integrate
//! 3. scroll the floor
//! 4. scroll pipes, eliminate colliding birds, detect passage
//! 5. on passage: score, reward survivors, spawn a pipe
//! 6. drop pipes that left the field
//! 7. eliminate birds on the ground or above the ceiling
//! 8. publish a frame
//! 9. check for termination

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::agent::Observation;
use super::floor::Floor;
use super::pipe::Pipe;
use super::sprites::Sprites;
use super::state::{Contestant, EndReason, EpisodeConfig, EpisodeReport, Phase, Roster};
use crate::consts::*;
use crate::platform::{QuitSignal, Surface, TickClock};
use crate::render::{BirdSprite, Frame, PipeSprite, RenderSink};

/// One generation's run through the course
pub struct Episode<'a> {
    sprites: &'a Sprites,
    config: EpisodeConfig,
    rng: Pcg32,
    contestants: Vec<Contestant<'a>>,
    pipes: Vec<Pipe>,
    floor: Floor,
    score: u32,
    ticks: u64,
    phase: Phase,
    target: Option<usize>,
    champion: Option<usize>,
}

impl<'a> Episode<'a> {
    pub fn new(roster: Roster<'a>, sprites: &'a Sprites, config: EpisodeConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let first = Pipe::new(FIRST_PIPE_X, &mut rng, sprites);
        Self {
            sprites,
            config,
            rng,
            contestants: roster.into_contestants(),
            pipes: vec![first],
            floor: Floor::new(FLOOR_Y, sprites.floor_width()),
            score: 0,
            ticks: 0,
            phase: Phase::Running,
            target: None,
            champion: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn alive(&self) -> usize {
        self.contestants.len()
    }

    pub fn contestants(&self) -> &[Contestant<'a>] {
        &self.contestants
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Index of the pipe the birds steer toward; `None` with no birds left
    pub fn target_pipe(&self) -> Option<usize> {
        let first = self.contestants.first()?;
        let mut index = 0;
        if self.pipes.len() > 1 && first.bird.x() > self.pipes[0].right(self.sprites) {
            index = 1;
        }
        Some(index)
    }

    /// Stop without running further ticks
    pub fn abort(&mut self) {
        if self.phase.is_running() {
            log::info!("Generation {} aborted at tick {}", self.config.generation, self.ticks);
            self.phase = Phase::Terminated(EndReason::Quit);
        }
    }

    /// Run one tick and publish its frame to `sink`
    pub fn step<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Phase {
        if !self.phase.is_running() {
            return self.phase;
        }
        debug_assert!(!self.pipes.is_empty(), "an episode always has a pipe");
        self.ticks += 1;
        let sprites = self.sprites;

        // 1. Target pipe, resolved before anything can be removed this tick
        self.target = self.target_pipe();

        // 2. Decisions and motion
        if let Some(target) = self.target {
            let (gap_height, gap_bottom) = (self.pipes[target].height, self.pipes[target].bottom);
            for contestant in &mut self.contestants {
                contestant.reward(SURVIVAL_REWARD);
                let observation = Observation::new(contestant.bird.y(), gap_height, gap_bottom);
                if contestant.agent.decide(&observation) > FLAP_THRESHOLD {
                    contestant.bird.jump();
                }
                contestant.bird.advance();
            }
        }

        // 3. Floor
        self.floor.advance();

        // 4. Pipes: collisions and passage
        let mut passage = false;
        for pipe in &mut self.pipes {
            pipe.advance();

            self.contestants.retain_mut(|contestant| {
                if pipe.collide(&contestant.bird, sprites) {
                    contestant.reward(-COLLISION_PENALTY);
                    log::trace!("slot {} hit a pipe at tick {}", contestant.slot, self.ticks);
                    false
                } else {
                    true
                }
            });

            if let Some(last) = self.contestants.last() {
                if !pipe.passed && pipe.right(sprites) < last.bird.x() {
                    pipe.passed = true;
                    passage = true;
                }
            }
        }

        // 5. Passage payout
        if passage {
            self.score += 1;
            for contestant in &mut self.contestants {
                contestant.reward(PASS_REWARD);
            }
            self.pipes.push(Pipe::new(SPAWN_PIPE_X, &mut self.rng, sprites));
        }

        // 6. Nothing has moved since step 4, so this drops exactly the pipes
        // that scrolled off there; the pipe spawned in step 5 is on screen.
        self.pipes.retain(|pipe| !pipe.is_off_screen(sprites));

        // 7. Ground and ceiling
        let floor_y = self.floor.y;
        let bird_height = sprites.bird_height();
        self.contestants.retain(|contestant| {
            let y = contestant.bird.y();
            let grounded = y + bird_height - GROUND_INSET >= floor_y;
            let escaped = y < CEILING_Y;
            if grounded || escaped {
                log::trace!("slot {} left the field at tick {}", contestant.slot, self.ticks);
            }
            !(grounded || escaped)
        });

        // 8. Animate and publish
        for contestant in &mut self.contestants {
            contestant.bird.animate();
        }
        sink.present(&self.frame());

        // 9. Termination
        if self.contestants.is_empty() {
            self.phase = Phase::Terminated(EndReason::Extinct);
        } else if self.score > self.config.score_cutoff {
            self.champion = self.contestants.first().map(|c| c.slot);
            self.phase = Phase::Terminated(EndReason::ScoreCutoff);
        }
        self.phase
    }

    /// Run to termination, pumping `surface` and honoring `quit` once per tick
    pub fn run<S: Surface + ?Sized>(&mut self, surface: &mut S, quit: &QuitSignal) -> EpisodeReport {
        let mut clock = surface.paced().then(|| TickClock::new(TICK_RATE));
        while self.phase.is_running() {
            if let Some(clock) = clock.as_mut() {
                clock.wait();
            }
            surface.pump();
            if quit.is_raised() {
                self.abort();
                break;
            }
            self.step(surface);
        }
        let report = self.report();
        log::debug!(
            "Generation {} ended after {} ticks: {:?}, score {}",
            report.generation,
            report.ticks,
            report.reason,
            report.score
        );
        report
    }

    /// Snapshot for the render sink
    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.ticks,
            birds: self
                .contestants
                .iter()
                .map(|c| BirdSprite {
                    pos: c.bird.pos,
                    tilt: c.bird.tilt,
                    frame: c.bird.frame,
                })
                .collect(),
            pipes: self
                .pipes
                .iter()
                .map(|p| PipeSprite {
                    x: p.x,
                    top: p.top,
                    bottom: p.bottom,
                    height: p.height,
                })
                .collect(),
            floor: (self.floor.x1, self.floor.x2),
            floor_y: self.floor.y,
            score: self.score,
            generation: self.config.generation,
            alive: self.contestants.len(),
            target_pipe: self.target,
        }
    }

    pub fn report(&self) -> EpisodeReport {
        let reason = match self.phase {
            Phase::Terminated(reason) => reason,
            Phase::Running => EndReason::Quit,
        };
        EpisodeReport {
            generation: self.config.generation,
            reason,
            score: self.score,
            ticks: self.ticks,
            survivors: self.contestants.len(),
            champion: self.champion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{NullSink, RecordingSink};
    use crate::sim::Bird;
    use crate::sim::agent::{Agent, ScriptedAgent, idle};

    #[test]
    fn test_empty_roster_ends_on_first_tick() {
        let sprites = Sprites::standard();
        let mut episode = Episode::new(Roster::Population(Vec::new()), &sprites, EpisodeConfig::default());
        assert_eq!(episode.target_pipe(), None);
        assert_eq!(episode.step(&mut NullSink), Phase::Terminated(EndReason::Extinct));
        assert_eq!(episode.pipes().len(), 1);
    }

    #[test]
    fn test_survival_reward_per_tick() {
        let sprites = Sprites::standard();
        let mut agent = idle();
        {
            let mut episode = Episode::new(Roster::Replay(&mut agent), &sprites, EpisodeConfig::default());
            for _ in 0..10 {
                episode.step(&mut NullSink);
            }
            assert!(episode.phase().is_running());
        }
        assert!((agent.fitness() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_observation_uses_target_gap() {
        let sprites = Sprites::standard();
        let mut seen = Vec::new();
        let mut agent = ScriptedAgent::new(|obs: &Observation| {
            seen.push(*obs);
            0.0
        });
        let expected_pipe;
        {
            let mut episode = Episode::new(Roster::Replay(&mut agent), &sprites, EpisodeConfig::default());
            expected_pipe = episode.pipes()[0].clone();
            episode.step(&mut NullSink);
        }
        drop(agent);
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            Observation::new(BIRD_START_Y, expected_pipe.height, expected_pipe.bottom)
        );
    }

    #[test]
    fn test_steps_after_termination_are_inert() {
        let sprites = Sprites::standard();
        let mut agent = idle();
        let mut episode = Episode::new(Roster::Replay(&mut agent), &sprites, EpisodeConfig::default());
        let mut sink = RecordingSink::default();
        while episode.step(&mut sink).is_running() {}
        let ticks = episode.ticks();
        episode.step(&mut sink);
        assert_eq!(episode.ticks(), ticks);
        assert_eq!(sink.frames.len() as u64, ticks);
    }

    #[test]
    fn test_quit_aborts_before_any_tick() {
        let sprites = Sprites::standard();
        let mut agent = idle();
        let mut episode = Episode::new(Roster::Replay(&mut agent), &sprites, EpisodeConfig::default());
        let quit = QuitSignal::new();
        quit.raise();
        let mut sink = RecordingSink::default();
        let report = episode.run(&mut sink, &quit);
        assert_eq!(report.reason, EndReason::Quit);
        assert_eq!(report.ticks, 0);
        assert!(sink.frames.is_empty());
    }

    /// One idle bird dropped just above the floor with a pipe wrapped around it
    fn grounding_into_pipe(agent: &mut dyn Agent, sprites: &Sprites, with_pipe: bool) -> Phase {
        let mut episode = Episode::new(Roster::Replay(agent), sprites, EpisodeConfig::default());
        let y = FLOOR_Y + GROUND_INSET - sprites.bird_height() - 0.5;
        episode.contestants[0].bird = Bird::new(BIRD_START_X, y);
        if with_pipe {
            // After scrolling its left edge lines up with the bird, bottom pipe across the body
            episode.pipes = vec![Pipe::with_height(BIRD_START_X + PIPE_VELOCITY, 500.0, sprites)];
        }
        episode.step(&mut NullSink)
    }

    #[test]
    fn test_pipe_and_ground_on_the_same_tick_penalize_once() {
        let sprites = Sprites::standard();

        let mut grounded = idle();
        let phase = grounding_into_pipe(&mut grounded, &sprites, false);
        assert_eq!(phase, Phase::Terminated(EndReason::Extinct));
        assert!((grounded.fitness() - SURVIVAL_REWARD).abs() < 1e-6);

        let mut crashed = idle();
        let phase = grounding_into_pipe(&mut crashed, &sprites, true);
        assert_eq!(phase, Phase::Terminated(EndReason::Extinct));
        assert!((crashed.fitness() - (SURVIVAL_REWARD - COLLISION_PENALTY)).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_course() {
        let sprites = Sprites::standard();
        let config = EpisodeConfig {
            seed: 42,
            ..Default::default()
        };
        let a = Episode::new(Roster::Population(Vec::new()), &sprites, config);
        let b = Episode::new(Roster::Population(Vec::new()), &sprites, config);
        assert_eq!(a.pipes(), b.pipes());
    }
}
