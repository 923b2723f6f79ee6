//! Bridge between world audio announcements and whatever plays sounds.
//!
//! The simulation core only announces tokens through
//! [`WorldEvent::EmitAudio`]. [`AudioBridge::connect`] subscribes to that
//! event and forwards each token as an [`AudioCmd::PlayFx`] on a crossbeam
//! channel, which an audio thread or a test can drain.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;

use crate::events::audio::AudioCmd;
use crate::events::bus::HandlerId;
use crate::events::world::{WorldEvent, WorldEventKind};
use crate::world::World;

pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (world -> audio consumer).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiving end, for the consumer.
    pub rx_cmd: Receiver<AudioCmd>,
    handler: HandlerId,
}

impl AudioBridge {
    /// Create the command channel and subscribe it to `world`'s audio events.
    pub fn connect(world: &World) -> Self {
        let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
        let tx = tx_cmd.clone();
        let handler = world.events().on(WorldEventKind::EmitAudio, move |event| {
            if let WorldEvent::EmitAudio(id) = event {
                debug!("audio: play {}", id);
                let _ = tx.send(AudioCmd::PlayFx { id: id.clone() });
            }
        });
        Self {
            tx_cmd,
            rx_cmd,
            handler,
        }
    }

    /// Commands queued so far, without blocking.
    pub fn drain(&self) -> Vec<AudioCmd> {
        self.rx_cmd.try_iter().collect()
    }

    /// Unsubscribe from `world` and tell the consumer to stop.
    pub fn shutdown(self, world: &World) {
        world.events().unbind(WorldEventKind::EmitAudio, self.handler);
        let _ = self.tx_cmd.send(AudioCmd::Shutdown);
    }
}
