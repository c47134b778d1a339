use std::sync::Arc;

use crate::RemoteArgs;

pub fn run(remote: &RemoteArgs, host: &str, port: u16, allow_remote: bool) {
    let ball = Arc::new(super::make_ball(remote));

    let base = format!("http://{host}:{port}");
    let sampler = ball.sampler();

    println!("🎱 qball server v{}", qball_core::VERSION);
    println!("   {base}");
    println!(
        "   {} answers, {} qubits per draw",
        sampler.range(),
        sampler.bit_width()
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /                 HTML page with one answer");
    println!("     GET /api              API index");
    println!("     GET /api/v1/answer    Ask the Magic 8-Ball (JSON)");
    println!("     GET /health           Sampler configuration");
    println!();
    println!("   Query params for /api/v1/answer:");
    println!("     mode=local|remote     Sampling backend (default: local)");
    if !allow_remote {
        println!("     (remote mode requires the --allow-remote flag)");
    } else if !sampler.has_remote() {
        println!("     (remote mode needs --token or IBM_TOKEN; requests will fail)");
    }
    println!();
    println!("   Examples:");
    println!("     curl {base}/api/v1/answer");
    println!("     curl {base}/health");
    println!();

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| super::fail(e));
    let result = rt.block_on(qball_server::run_server(
        Arc::clone(&ball),
        host,
        port,
        allow_remote,
    ));
    drop(rt);
    if let Err(e) = result {
        super::fail(format!("server on {base} stopped: {e}"));
    }
}
