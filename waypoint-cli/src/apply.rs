//! Running provider operations against the recorded state

use waypoint_core::effect::Effect;
use waypoint_core::provider::{Provider, ProviderResult};
use waypoint_core::resource::State;
use waypoint_state::StateFile;

/// Re-read every recorded resource and record what the provider reports
///
/// Resources that no longer exist remotely are dropped from the state.
pub async fn refresh(provider: &dyn Provider, state: &mut StateFile) -> Result<usize, String> {
    let mut current: Vec<State> = state.current_states().into_values().collect();
    current.sort_by(|a, b| a.id.cmp(&b.id));

    let mut dropped = 0;
    for recorded in current {
        let refreshed = provider
            .read(&recorded.id, &recorded)
            .await
            .map_err(|e| format!("Failed to read state: {}", e))?;
        if !refreshed.exists {
            log::info!("{} no longer exists, removing it from the state", recorded.id);
            dropped += 1;
        }
        state.record(&refreshed);
    }
    Ok(dropped)
}

/// Execute a single effect and record its outcome in `state`
///
/// Returns the resulting state for reads, creates and updates.
pub async fn apply_effect(
    provider: &dyn Provider,
    effect: &Effect,
    state: &mut StateFile,
) -> ProviderResult<Option<State>> {
    match effect {
        Effect::Read(resource) => provider.read_data_source(resource).await.map(Some),
        Effect::Create(resource) => {
            let created = provider.create(resource).await?;
            state.record(&created);
            Ok(Some(created))
        }
        Effect::Update { id, from, to } => {
            let updated = provider.update(id, from, to).await?;
            state.record(&updated);
            Ok(Some(updated))
        }
        Effect::Delete(current) => {
            provider.delete(current).await?;
            state.remove_resource(&current.id.resource_type, &current.id.name);
            Ok(None)
        }
    }
}
