//! Named per-frame tasks, each an ECS system in its own [`Schedule`], run in
//! registration order over one [`World`].

use bevy_ecs::prelude::*;
use tracing::{debug, warn};

/// What a task wants after it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Run again next frame.
    Continue,
    /// Remove the task.
    Done,
}

/// Frame timing for the systems of the current run.
///
/// Inserted by [`FrameScheduler::run`] before any task runs.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Wall-clock seconds since the previous frame.
    pub delta: f64,
    /// Zero-based number of the frame being run.
    pub frame: u64,
}

/// Tasks that reported [`TaskStatus::Done`] during the current run.
#[derive(Resource, Debug, Default)]
struct FinishedTasks(Vec<String>);

/// Ordered list of named per-frame tasks.
///
/// Every [`run`](Self::run) runs each task's schedule once, in the order the
/// tasks were added. Names are unique.
#[derive(Default)]
pub struct FrameScheduler {
    tasks: Vec<(String, Schedule)>,
    frame: u64,
}

impl FrameScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the system `task` under `name`. Returns `false`, leaving the
    /// existing task in place, if the name is taken.
    pub fn add_task<M>(
        &mut self,
        name: impl Into<String>,
        task: impl IntoSystem<(), TaskStatus, M>,
    ) -> bool {
        let name = name.into();
        if self.has_task(&name) {
            warn!(task = %name, "task already registered");
            return false;
        }

        let label = name.clone();
        let mut schedule = Schedule::default();
        schedule.add_systems(task.pipe(
            move |In(status): In<TaskStatus>, mut finished: ResMut<'_, FinishedTasks>| {
                if status == TaskStatus::Done {
                    finished.0.push(label.clone());
                }
            },
        ));
        debug!(task = %name, "task added");
        self.tasks.push((name, schedule));
        true
    }

    /// Remove a task by name. Returns whether it existed.
    pub fn remove_task(&mut self, name: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(n, _)| n != name);
        before != self.tasks.len()
    }

    /// Whether a task with `name` is registered.
    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.iter().any(|(n, _)| n == name)
    }

    /// Task names in run order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|(n, _)| n.as_str())
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Frames run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every task once against `world`. Tasks returning
    /// [`TaskStatus::Done`] are dropped after the frame.
    pub fn run(&mut self, world: &mut World, dt: f64) {
        world.insert_resource(FrameTime {
            delta: dt,
            frame: self.frame,
        });
        world.init_resource::<FinishedTasks>();

        for (_name, schedule) in &mut self.tasks {
            schedule.run(world);
        }

        let finished = std::mem::take(&mut world.resource_mut::<FinishedTasks>().0);
        if !finished.is_empty() {
            self.tasks.retain(|(name, _)| {
                let done = finished.contains(name);
                if done {
                    debug!(task = %name, "task finished");
                }
                !done
            });
        }
        self.frame += 1;
    }
}
