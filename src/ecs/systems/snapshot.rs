//! Snapshot recording (Record phase). Reads the committed state of the tick.

use std::collections::BTreeMap;

use bevy_app::App;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Query, Res, ResMut};

use crate::behavior::Behavior;
use crate::ecs::clock::SimClock;
use crate::ecs::commands::LastCommit;
use crate::ecs::components::{Agent, Position};
use crate::ecs::resources::{EcsSimConfig, SiteMap, SnapshotLog};
use crate::ecs::schedule::{SimPhase, SimTick};
use crate::model::{AgentAnnotation, SiteCount, Snapshot, Species};

pub fn add_snapshot_systems(app: &mut App) {
    app.add_systems(SimTick, record_snapshot.in_set(SimPhase::Record));
}

pub fn record_snapshot(
    agents: Query<(&Agent, &Position, &Behavior)>,
    clock: Res<SimClock>,
    sites: Res<SiteMap>,
    config: Res<EcsSimConfig>,
    last_commit: Res<LastCommit>,
    mut log: ResMut<SnapshotLog>,
) {
    let mut counts: BTreeMap<Species, u32> = Species::ALL.iter().map(|s| (*s, 0)).collect();
    let mut site_counts: BTreeMap<_, SiteCount> =
        sites.0.iter().map(|s| (s.id, SiteCount::default())).collect();
    let mut annotations = config.0.record_agent_annotations.then(Vec::new);

    for (agent, position, behavior) in &agents {
        *counts.entry(agent.species).or_default() += 1;
        for site in sites.0.iter().filter(|s| s.contains(position.0)) {
            let count = site_counts.entry(site.id).or_default();
            count.on_site += 1;
            if behavior.is_still() {
                count.still += 1;
            }
        }
        if let Some(annotations) = annotations.as_mut() {
            annotations.push(AgentAnnotation {
                id: agent.id,
                species: agent.species,
                age: behavior.age(),
                energy: behavior.energy(),
            });
        }
    }
    if let Some(annotations) = annotations.as_mut() {
        annotations.sort_by_key(|a| a.id);
    }

    log.0.push(Snapshot {
        tick: clock.tick_count,
        counts,
        sites: site_counts,
        births: last_commit.0.born,
        deaths: last_commit.0.killed,
        agents: annotations,
    });
}
