use ccg_protocol::{CatId, HeadId};

/// Counters for fresh node ids and head groups.
///
/// One context per parse. Operations that build nodes take it by `&mut`,
/// so two parses never share numbering and a replay is reproducible.
#[derive(Debug, Clone)]
pub struct IdContext {
    last_id: u32,
    last_head_id: u32,
}

impl IdContext {
    pub fn new() -> Self {
        Self {
            last_id: 0,
            last_head_id: 1,
        }
    }

    pub fn fresh_id(&mut self) -> CatId {
        self.last_id += 1;
        CatId::new(self.last_id)
    }

    pub fn fresh_head_id(&mut self) -> HeadId {
        self.last_head_id += 1;
        HeadId::new(self.last_head_id)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for IdContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_origin() {
        let mut ctx = IdContext::new();
        assert_eq!(ctx.fresh_id(), CatId::new(1));
        assert_eq!(ctx.fresh_id(), CatId::new(2));
        assert_eq!(ctx.fresh_head_id(), HeadId::new(2));

        ctx.reset();
        assert_eq!(ctx.fresh_id(), CatId::new(1));
        assert_eq!(ctx.fresh_head_id(), HeadId::new(2));
    }
}
