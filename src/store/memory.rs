use crate::store::{RemoteStore, StoreError, StorePath};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// 메모리 위에서 동작하는 계층형 저장소
///
/// 실시간 데이터베이스와 같이 값이 없는 노드는 존재하지 않는 것으로 취급하며,
/// 값을 삭제해 비게 된 상위 노드도 함께 제거한다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: RwLock<Map<String, Value>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소가 받은 전체 호출 수
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 오프라인 상태에서는 모든 호출이 [`StoreError::RequestFailed`]로 실패한다.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// 트리 전체를 JSON 값으로 복사해 반환한다.
    pub fn dump(&self) -> Value {
        self.tree.read()
            .map(|tree| Value::Object(tree.clone()))
            .unwrap_or(Value::Null)
    }

    fn begin(&self, op: &str, path: &StorePath) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(op, path = %path, "memory store call");

        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::RequestFailed(format!("{} {}: store is offline", op, path)));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn read_once(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.begin("read", path)?;

        let tree = self.tree.read()
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if path.is_root() {
            return Ok((!tree.is_empty()).then(|| Value::Object(tree.clone())));
        }

        let mut node = tree.get(&path.segments()[0]);
        for key in &path.segments()[1..] {
            node = node.and_then(|n| n.get(key));
        }
        Ok(node.cloned())
    }

    fn set_value(&self, path: &StorePath, value: &Value) -> Result<(), StoreError> {
        if value.is_null() {
            return self.remove_value(path);
        }
        self.begin("set", path)?;

        let mut tree = self.tree.write()
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        let Some((last, parents)) = path.segments().split_last() else {
            return match value {
                Value::Object(map) => {
                    *tree = map.clone();
                    Ok(())
                }
                _ => Err(StoreError::InvalidKey("root only accepts an object".to_owned())),
            };
        };

        let mut node = &mut *tree;
        for key in parents {
            let child = node.entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            node = child.as_object_mut()
                .ok_or_else(|| StoreError::InvalidKey(key.clone()))?;
        }
        node.insert(last.clone(), value.clone());
        Ok(())
    }

    fn remove_value(&self, path: &StorePath) -> Result<(), StoreError> {
        self.begin("remove", path)?;

        let mut tree = self.tree.write()
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if path.is_root() {
            tree.clear();
        } else {
            remove_and_prune(&mut tree, path.segments());
        }
        Ok(())
    }
}

/// 경로의 값을 지우고, 비게 된 상위 노드를 제거한다. 노드가 비었으면 `true`를 반환한다.
fn remove_and_prune(node: &mut Map<String, Value>, segments: &[String]) -> bool {
    match segments {
        [] => {}
        [last] => {
            node.remove(last);
        }
        [first, rest @ ..] => {
            let emptied = match node.get_mut(first) {
                Some(Value::Object(child)) => remove_and_prune(child, rest),
                _ => false,
            };
            if emptied {
                node.remove(first);
            }
        }
    }
    node.is_empty()
}
