// -----------------------
// Deterministic RNG (LCG)
// -----------------------
/// Tiny deterministic RNG used to pick level seeds.
#[derive(Clone, Copy, Debug)]
pub struct LcgRng { state: u64 }

impl LcgRng {
    pub fn new(seed: u64) -> Self { Self { state: seed } }
    #[inline]
    fn step(&mut self) { self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407); }
    pub fn next_u32(&mut self) -> u32 { self.step(); (self.state >> 32) as u32 }
    pub fn gen_index(&mut self, upper: usize) -> usize { if upper == 0 { 0 } else { (self.next_u32() as usize) % upper } }

    /// One of `choices`, or `None` when there are none.
    pub fn choose<T: Copy>(&mut self, choices: &[T]) -> Option<T> {
        if choices.is_empty() { return None; }
        Some(choices[self.gen_index(choices.len())])
    }
}
