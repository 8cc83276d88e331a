use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::member::Member;
use crate::domain::value_objects::MemberId;
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};

/// In-memory implementation of MemberRepository
pub struct MemberRepository {
    members: Mutex<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemberRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn find_by_id(&self, member_id: &MemberId) -> Result<Option<Member>> {
        Ok(self.members.lock().unwrap().get(member_id).cloned())
    }

    async fn exists_by_id(&self, member_id: &MemberId) -> Result<bool> {
        Ok(self.members.lock().unwrap().contains_key(member_id))
    }

    async fn save(&self, member: Member) -> Result<()> {
        self.members
            .lock()
            .unwrap()
            .insert(member.id.clone(), member);
        Ok(())
    }

    async fn delete(&self, member_id: &MemberId) -> Result<()> {
        self.members.lock().unwrap().remove(member_id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self.members.lock().unwrap().values().cloned().collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(members)
    }
}
