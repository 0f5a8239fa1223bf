/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation/sound.

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    CoinPicked { x: f32, y: f32 },
    LifePicked { x: f32, y: f32 },
    Jumped,
    DoubleJumped,
    EnemyStomped { x: f32, y: f32 },
    PlayerDied,
    AllCoinsCollected,
    DoorOpened,
    DoorEntered,
    LevelCleared,
}
