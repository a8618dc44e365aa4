#![no_main]
#![no_std]

use lpbeacon as _; // global logger + panicking-behavior + memory layout

use lpbeacon::constants::TICK_HZ;
use lpbeacon::cycle::TaskSleep;
use lpbeacon::event::EventSignal;
use rtic_monotonics::systick::prelude::*;

systick_monotonic!(Mono, TICK_HZ);

/// Radio IRQ -> transmit task.
static TX_EVENTS: EventSignal = EventSignal::new();

struct MonoSleep;

impl TaskSleep for MonoSleep {
    async fn sleep_ticks(&mut self, ticks: u32) {
        Mono::delay(<Mono as Monotonic>::Duration::from_ticks(ticks)).await;
    }
}

#[rtic::app(
    device = stm32wlxx_hal::pac,
    dispatchers = [DAC, USART2]
)]
mod app {
    use super::{Mono, MonoSleep, TX_EVENTS};
    use lpbeacon::board::{Board, BoardLeds, Button};
    use lpbeacon::bootstrap::bring_up;
    use lpbeacon::config::{CycleTiming, Payload};
    use lpbeacon::constants::{NODE_CONFIG, SYSCLK_HZ, TICK_HZ};
    use lpbeacon::cycle::TransmitCycle;
    use lpbeacon::event::EventBits;
    use lpbeacon::radio::subghz::SubGhzRadio;
    use lpbeacon::radio::{post_tx_events, SharedRadio};
    use lpbeacon::reset::{ResetGuard, ScbReset};

    #[shared]
    struct Shared {
        radio: SubGhzRadio,
    }

    #[local]
    struct Local {
        leds: BoardLeds,
        reset_guard: ResetGuard<Button, ScbReset>,
        payload: Payload,
        timing: CycleTiming,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        defmt::info!("init");

        let mut board = Board::new(ctx.device);
        let node = match bring_up(&mut board, &NODE_CONFIG, TICK_HZ) {
            Ok(node) => node,
            Err(e) => lpbeacon::fatal(e),
        };

        // SYSCLK is only final once the board is up
        Mono::start(ctx.core.SYST, SYSCLK_HZ);

        defmt::unwrap!(transmit_cycle::spawn());

        (
            Shared { radio: node.radio },
            Local {
                leds: node.leds,
                reset_guard: node.reset_guard,
                payload: node.payload,
                timing: node.timing,
            },
        )
    }

    #[task(binds = RADIO_IRQ_BUSY, shared = [radio], priority = 3)]
    fn radio_irq(mut ctx: radio_irq::Context) {
        match ctx.shared.radio.lock(|radio| radio.take_irq_status()) {
            Ok(irq) => post_tx_events(irq, &TX_EVENTS),
            // status unreadable: wake the loop with the abnormal pattern rather than hang it
            Err(_) => TX_EVENTS.post(EventBits::TX_ANY),
        }
    }

    #[task(binds = EXTI0, local = [reset_guard], priority = 4)]
    fn button(ctx: button::Context) {
        ctx.local.reset_guard.trigger()
    }

    #[task(priority = 1, shared = [radio], local = [leds, payload, timing])]
    async fn transmit_cycle(ctx: transmit_cycle::Context) {
        let mut cycle = TransmitCycle::new(
            SharedRadio(ctx.shared.radio),
            ctx.local.leds,
            MonoSleep,
            &TX_EVENTS,
            &ctx.local.payload[..],
            *ctx.local.timing,
        );

        match cycle.run().await {
            Ok(never) => match never {},
            Err(e) => defmt::panic!("radio fault: {}", e),
        }
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        defmt::info!("idle");

        loop {
            cortex_m::asm::wfi();
        }
    }
}
