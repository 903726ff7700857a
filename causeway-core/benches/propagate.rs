//! Criterion micro-benchmarks for graph propagation.

use causeway_core::{
    BaselinePolicy, CausalGraph, Edge, Node, NodeHandle, PropagationConfig, Variables,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Debug, Default)]
struct Accumulator {
    incoming: u64,
    total: u64,
}

impl Node for Accumulator {
    type State = u64;
    type Input = u64;

    fn update(&mut self) -> bool {
        self.total = self.incoming;
        true
    }

    fn state_variables(&self) -> u64 {
        self.total
    }

    fn input_variables(&self) -> u64 {
        self.incoming
    }

    fn restore(&mut self, variables: Variables<u64, u64>) {
        self.total = variables.state;
        self.incoming = variables.input;
    }
}

struct Pass {
    source: NodeHandle<Accumulator>,
    target: NodeHandle<Accumulator>,
    gain: u64,
}

impl Edge for Pass {
    type Source = Accumulator;
    type Target = Accumulator;

    fn source(&self) -> &NodeHandle<Accumulator> {
        &self.source
    }

    fn target(&self) -> &NodeHandle<Accumulator> {
        &self.target
    }

    fn effect(&self) -> bool {
        let total = self.source.read().total;
        self.target.write().incoming = total * self.gain;
        true
    }
}

/// Build `len` nodes linked in a chain, optionally closed into a ring with
/// the given gain on the closing edge.
fn build(len: usize, closing_gain: Option<u64>) -> (CausalGraph, Vec<NodeHandle<Accumulator>>) {
    let nodes: Vec<_> = (0..len)
        .map(|_| NodeHandle::new(Accumulator::default()))
        .collect();
    let config = PropagationConfig::default().with_baseline(BaselinePolicy::Settled);
    let mut graph = CausalGraph::with_config(config);
    for pair in nodes.windows(2) {
        graph.add_edge(Pass {
            source: pair[0].clone(),
            target: pair[1].clone(),
            gain: 1,
        });
    }
    if let Some(gain) = closing_gain {
        graph.add_edge(Pass {
            source: nodes[len - 1].clone(),
            target: nodes[0].clone(),
            gain,
        });
    }
    (graph, nodes)
}

/// Benchmark: Propagate a change down a 64-node chain.
fn bench_chain_64(c: &mut Criterion) {
    let (mut graph, nodes) = build(64, None);
    let mut step = 0u64;

    c.bench_function("propagate_chain_64", |b| {
        b.iter(|| {
            step += 1;
            nodes[0].write().incoming = step;
            black_box(graph.propagate().unwrap());
        });
    });
}

/// Benchmark: Propagate around a 64-node ring that settles against the
/// post-update baseline.
fn bench_ring_settles_64(c: &mut Criterion) {
    let (mut graph, nodes) = build(64, Some(1));
    let mut step = 0u64;

    c.bench_function("propagate_ring_settles_64", |b| {
        b.iter(|| {
            step += 1;
            nodes[0].write().incoming = step;
            black_box(graph.propagate().unwrap());
        });
    });
}

/// Benchmark: Propagate around a 64-node ring that conflicts and rolls back.
fn bench_ring_rollback_64(c: &mut Criterion) {
    let (mut graph, nodes) = build(64, Some(2));
    nodes[0].write().incoming = 1;

    c.bench_function("propagate_ring_rollback_64", |b| {
        b.iter(|| {
            black_box(graph.propagate().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_chain_64,
    bench_ring_settles_64,
    bench_ring_rollback_64
);
criterion_main!(benches);
