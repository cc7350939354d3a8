// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::Settings;

#[test]
fn test_defaults_load_without_config_file() {
    let settings = Settings::new().expect("defaults should always load");

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.backup.root_dir, "./backups");
    assert_eq!(settings.backup.delete_wait_secs, 300);
    assert_eq!(settings.scheduler.tick_secs, 60);
    assert_eq!(settings.github.api_base, "https://api.github.com");
    assert_eq!(settings.metrics.listen_addr, "0.0.0.0:9000");
    assert_eq!(settings.database.max_connections, Some(20));
}
