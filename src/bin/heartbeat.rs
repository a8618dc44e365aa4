#![no_main]
#![no_std]

use lpbeacon as _; // global logger + panicking-behavior + memory layout

use lpbeacon::constants::TICK_HZ;
use lpbeacon::cycle::TaskSleep;
use rtic_monotonics::systick::prelude::*;

systick_monotonic!(Mono, TICK_HZ);

struct MonoSleep;

impl TaskSleep for MonoSleep {
    async fn sleep_ticks(&mut self, ticks: u32) {
        Mono::delay(<Mono as Monotonic>::Duration::from_ticks(ticks)).await;
    }
}

#[rtic::app(
    device = stm32wlxx_hal::pac,
    dispatchers = [DAC]
)]
mod app {
    use super::{Mono, MonoSleep};
    use lpbeacon::board::{Board, BoardLeds, Button};
    use lpbeacon::bootstrap::bring_up;
    use lpbeacon::constants::{HEARTBEAT_PHASE_MS, NODE_CONFIG, SYSCLK_HZ, TICK_HZ};
    use lpbeacon::heartbeat::Heartbeat;
    use lpbeacon::radio::subghz::SubGhzRadio;
    use lpbeacon::reset::{ResetGuard, ScbReset};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        radio: SubGhzRadio,
        leds: BoardLeds,
        reset_guard: ResetGuard<Button, ScbReset>,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        defmt::info!("init");

        let mut board = Board::new(ctx.device);
        let node = match bring_up(&mut board, &NODE_CONFIG, TICK_HZ) {
            Ok(node) => node,
            Err(e) => lpbeacon::fatal(e),
        };

        Mono::start(ctx.core.SYST, SYSCLK_HZ);

        defmt::unwrap!(blink::spawn());

        (
            Shared {},
            Local {
                radio: node.radio,
                leds: node.leds,
                reset_guard: node.reset_guard,
            },
        )
    }

    #[task(binds = EXTI0, local = [reset_guard], priority = 2)]
    fn button(ctx: button::Context) {
        ctx.local.reset_guard.trigger()
    }

    #[task(priority = 1, local = [radio, leds])]
    async fn blink(ctx: blink::Context) {
        let mut heartbeat = Heartbeat::new(ctx.local.leds, MonoSleep, HEARTBEAT_PHASE_MS, TICK_HZ);

        match heartbeat.run(ctx.local.radio).await {
            Ok(never) => match never {},
            Err(e) => defmt::panic!("radio fault: {}", e),
        }
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}
