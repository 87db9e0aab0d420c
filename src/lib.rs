/*!
caminos-router-core
===================

A cycle-accurate network-on-chip router and allocator core: credit-based virtual-channel
input-queued routers (route compute, VC allocation, switch allocation, switch traversal),
a family of bipartite-matching allocators and single-resource arbiters, and the minimal
topology/routing/traffic collaborators needed to wire routers into a whole `Network` and
drive it cycle by cycle.

This crate keeps the router/allocator/arbiter core of the wider CAMINOS-lineage simulator
and drops the multi-run experiment orchestration built around it (configuration file
grammar, CLI argument parsing, remote/slurm job submission, plotting). See `DESIGN.md` for
what was kept, what was dropped, and why.

# Usage

Build a [`network::Network`] from a [`topology::Topology`], a router
[`config::ConfigurationValue`], and link latencies, then call [`network::Network::tick`]
once per cycle, supplying a [`routing::Routing`] and a [`traffic::Traffic`]:

```ignore
let mut net = Network::new(NetworkBuilderArgument{ cv:&router_cv, topology:&topo, link_latency:1, credit_latency:1 })?;
let mut rng = StdRng::seed_from_u64(seed);
for _ in 0..cycles
{
    net.tick(&routing, &mut traffic, &mut rng);
}
```

# Configuration syntax

Routers, allocators and arbiters are all built from a `ConfigurationValue::Object` tree,
parsed out of text such as

```ignore
IQRouter
{
    num_vcs: 4,
    vc_buf_size: 8,
    vc_allocator: Islip{ iters: 3 },
    sw_allocator: SeparableInputFirst,
    speculative: 1,
    hold_switch_for_packet: true,
}
```

with [`config_parser::parse`], or constructed directly as a tree of
[`config::ConfigurationValue`] values for programmatic use, as the test suites throughout
this crate do.
*/

#[macro_use] mod error;
#[macro_use] mod config;

pub mod time;
pub mod quantify;
pub mod pool;
pub mod flit;
pub mod credit;
pub mod channel;
pub mod buffer;
pub mod bufferstate;
pub mod matrix;
pub mod arbiter;
pub mod allocator;
pub mod routing;
pub mod topology;
pub mod traffic;
pub mod router;
pub mod network;
pub mod measures;
pub mod config_parser;

pub use quantifiable_derive::Quantifiable;

pub use error::{Error,ErrorKind,SourceLocation};
pub use config::ConfigurationValue;
pub use time::Time;
pub use flit::Flit;
pub use credit::Credit;
pub use channel::{Channel,FlitChannel,CreditChannel};
pub use buffer::{Buffer,OutputSet,PriorityPolicy,VcState};
pub use bufferstate::BufferState;
pub use allocator::{Allocator,AllocatorBuilderArgument,AllocRequest,Grant,new_allocator};
pub use arbiter::{Arbiter,ArbiterBuilderArgument,ArbiterRequest,new_arbiter};
pub use routing::Routing;
pub use topology::{Topology,Location};
pub use traffic::Traffic;
pub use router::{Router,RouterBuilderArgument};
pub use network::{Network,NetworkBuilderArgument};
