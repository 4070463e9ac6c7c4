//! Application state shared between the caller and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};

use merger_core::commands::PlayerCommand;
use merger_core::state::GameStateSnapshot;
use merger_sim::SimConfig;

use crate::game_loop;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle to a (possibly running) game loop.
///
/// - `mpsc::Sender` sits behind a `Mutex` so the state is `Sync`
/// - `Mutex<Option<...>>` for the sender, which only exists once started
/// - `Arc<Mutex<...>>` for the latest snapshot (shared with the loop thread)
pub struct AppState {
    /// `None` before `start` is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    pub running: Mutex<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the game loop. Fails if one is already running.
    pub fn start(&self, config: SimConfig) -> Result<()> {
        let mut running = self.running.lock().map_err(|e| anyhow!(e.to_string()))?;
        if *running {
            bail!("simulation already running");
        }

        let cmd_tx = game_loop::spawn_game_loop(config, self.latest_snapshot.clone())?;

        let mut tx_lock = self.command_tx.lock().map_err(|e| anyhow!(e.to_string()))?;
        *tx_lock = Some(cmd_tx);
        *running = true;
        Ok(())
    }

    /// Forward a player command to the loop.
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.send_raw(GameLoopCommand::PlayerCommand(command))
    }

    /// Stop the loop. A no-op when nothing is running.
    pub fn shutdown(&self) -> Result<()> {
        let mut running = self.running.lock().map_err(|e| anyhow!(e.to_string()))?;
        if !*running {
            return Ok(());
        }
        let mut tx_lock = self.command_tx.lock().map_err(|e| anyhow!(e.to_string()))?;
        if let Some(tx) = tx_lock.take() {
            // A disconnected loop has already stopped.
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        *running = false;
        Ok(())
    }

    /// Latest snapshot published by the loop, if any.
    pub fn snapshot(&self) -> Result<Option<GameStateSnapshot>> {
        let lock = self
            .latest_snapshot
            .lock()
            .map_err(|e| anyhow!(e.to_string()))?;
        Ok(lock.clone())
    }

    fn send_raw(&self, command: GameLoopCommand) -> Result<()> {
        let tx_lock = self.command_tx.lock().map_err(|e| anyhow!(e.to_string()))?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(command)
                .map_err(|e| anyhow!("failed to send command: {e}")),
            None => bail!("simulation not started"),
        }
    }
}
