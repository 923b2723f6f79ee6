/// Commands sent *to* whatever plays sounds.
///
/// The simulation core only announces; it never loads or mixes audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    PlayFx { id: String },
    StopFx { id: String },
    Shutdown,
}
