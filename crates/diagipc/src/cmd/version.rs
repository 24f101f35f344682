use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("diagipc {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: diagipc");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("protocol: DOTNET_IPC_V1");
    println!(
        "build_target: {}",
        option_env!("DIAGIPC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    #[cfg(unix)]
    let transport = diagipc_transport::UnixDomainSocket::transport_name();
    #[cfg(not(unix))]
    let transport = "unsupported";
    println!("transport: {transport}");

    Ok(SUCCESS)
}
