use clap::Parser;
use holostand::testkit::RecordingHost;
use holostand::{
    EntityIdAllocator, HologramBuilder, HologramRegistry, InteractAction, InteractHandler,
    Location, ProtocolDialect, UseAction, UseEntityPacket,
};

#[derive(Parser, Debug)]
#[command(
    name = "holostand-sim",
    about = "Scripted hologram session against a recording host"
)]
struct Args {
    /// Protocol dialect to encode for: legacy or modern.
    #[arg(long, default_value = "modern")]
    dialect: String,
    /// Number of update ticks to run.
    #[arg(long, default_value_t = 6)]
    ticks: u32,
    /// Tick at which the scripted observer walks out of range.
    #[arg(long, default_value_t = 2)]
    leave_at: u32,
    /// Tick at which the scripted observer walks back in range.
    #[arg(long, default_value_t = 4)]
    return_at: u32,
}

const WORLD: u64 = 0;
const OBSERVER: u64 = 1;

fn main() {
    env_logger::init();
    let args = Args::parse();

    let dialect = match args.dialect.as_str() {
        "legacy" => ProtocolDialect::Legacy,
        "modern" => ProtocolDialect::Modern,
        other => {
            eprintln!("unknown dialect '{other}'; expected legacy or modern");
            std::process::exit(2);
        }
    };

    let near = Location::new(WORLD, 10.0, 64.0, 0.0);
    let far = Location::new(WORLD, 9000.0, 64.0, 0.0);

    let mut host = RecordingHost::new(dialect);
    host.place_observer(OBSERVER, near);

    let mut registry = HologramRegistry::new(EntityIdAllocator::new());
    let mut handler = InteractHandler::new();
    handler.add_action(InteractAction::LeftClick, |context| {
        log::info!(
            "observer {} left-clicked line {} (entity {})",
            context.observer,
            context.line_index,
            context.entity_id
        );
    });
    let id = HologramBuilder::new()
        .add_line("Welcome to the arena")
        .add_dynamic_line(|observer| format!("you are observer #{observer}"))
        .add_empty_line()
        .add_line("click me")
        .interact_handler(handler)
        .build(&mut registry)
        .expect("demo hologram builds");

    registry
        .get_mut(id)
        .expect("hologram is registered")
        .spawn(&mut host, Location::new(WORLD, 0.5, 64.0, 0.5));
    log::info!(
        "spawned hologram {id} ({} packets so far)",
        host.sent.len()
    );

    for tick in 0..args.ticks {
        if tick == args.leave_at {
            host.place_observer(OBSERVER, far);
            log::info!("tick {tick}: observer walks out of range");
        }
        if tick == args.return_at {
            host.place_observer(OBSERVER, near);
            log::info!("tick {tick}: observer walks back in range");
        }
        let before = host.sent.len();
        registry.tick_all(&mut host);
        log::info!("tick {tick}: {} packets sent", host.sent.len() - before);
    }

    // A scripted click on the bottom line.
    let bottom = registry
        .get(id)
        .expect("hologram is registered")
        .lines()
        .last()
        .expect("hologram has lines")
        .entity_id();
    registry.handle_use_entity(
        OBSERVER,
        UseEntityPacket {
            entity_id: bottom,
            action: UseAction::Attack,
        },
    );

    println!("dialect: {dialect:?}");
    println!("total packets: {}", host.sent.len());
    for (observer, packet) in &host.sent {
        let bytes = packet
            .to_wire_bytes()
            .map(|encoded| encoded.len())
            .unwrap_or(0);
        println!("  -> observer {observer}: {packet:?} ({bytes} wire bytes)");
    }
}
